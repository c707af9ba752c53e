//! Typed resource slots.
//!
//! A [`ResourceSlot`] is bound to one remote endpoint and one element type.
//! Fetching replaces the whole payload or nothing: the payload is an
//! `Arc<Vec<T>>`, so anyone still holding the previous list keeps seeing it.

use core::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::SlotError;
use crate::remote::{CallClass, RemoteSource};

/// The seven resources that make up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// The user's current simulation.
    Simulations,
    /// Commodities.
    Commodities,
    /// Industries.
    Industries,
    /// Social classes.
    Classes,
    /// Stocks owned by industries.
    IndustryStocks,
    /// Stocks owned by classes.
    ClassStocks,
    /// The server's simulation log.
    Trace,
}

impl ResourceKind {
    /// Every resource, in snapshot key order.
    pub const ALL: [Self; 7] = [
        Self::Simulations,
        Self::Commodities,
        Self::Industries,
        Self::Classes,
        Self::IndustryStocks,
        Self::ClassStocks,
        Self::Trace,
    ];

    /// The snapshot key for this resource.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simulations => "simulations",
            Self::Commodities => "commodities",
            Self::Industries => "industries",
            Self::Classes => "classes",
            Self::IndustryStocks => "industry-stocks",
            Self::ClassStocks => "class-stocks",
            Self::Trace => "trace",
        }
    }

    /// The server path a snapshot fetches this resource from.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Simulations => "simulations/current",
            Self::Commodities => "commodity",
            Self::Industries => "industry",
            Self::Classes => "classes",
            Self::IndustryStocks => "stocks/industry",
            Self::ClassStocks => "stocks/class",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed placeholder for one remote table.
#[derive(Debug, Clone)]
pub struct ResourceSlot<T> {
    kind: ResourceKind,
    endpoint: String,
    credential: String,
    payload: Arc<Vec<T>>,
}

impl<T: DeserializeOwned> ResourceSlot<T> {
    /// An empty slot fetching `kind` from its usual endpoint.
    pub fn new(kind: ResourceKind, credential: &str) -> Self {
        Self::with_endpoint(kind, kind.endpoint(), credential)
    }

    /// An empty slot fetching `kind` from a specific endpoint.
    pub fn with_endpoint(kind: ResourceKind, endpoint: &str, credential: &str) -> Self {
        Self {
            kind,
            endpoint: endpoint.to_owned(),
            credential: credential.to_owned(),
            payload: Arc::new(Vec::new()),
        }
    }

    /// Fetch the endpoint and, on success, replace the payload.
    ///
    /// Returns the number of rows now held.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] and leaves the payload untouched when the
    /// round trip fails, the body is empty or `[]`, or the body does not
    /// decode as a list of `T`.
    pub async fn fetch(&mut self, remote: &RemoteSource) -> Result<usize, SlotError> {
        let resource = self.kind;
        let body = remote
            .get(&self.endpoint, &self.credential, CallClass::Data)
            .await
            .map_err(|source| {
                warn!(%resource, error = %source, "resource fetch failed");
                SlotError::Remote { resource, source }
            })?;

        if body.is_empty() {
            debug!(%resource, "server sent an empty body");
            return Err(SlotError::EmptyBody { resource });
        }
        if body.trim_ascii() == b"[]" {
            debug!(%resource, "server has no rows yet");
            return Err(SlotError::NoRows { resource });
        }

        let rows: Vec<T> = serde_json::from_slice(&body).map_err(|source| {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(%resource, error = %source, body, "resource did not decode");
            SlotError::Decode {
                resource,
                source,
                body,
            }
        })?;
        if rows.is_empty() {
            return Err(SlotError::NoRows { resource });
        }

        let count = rows.len();
        self.payload = Arc::new(rows);
        debug!(%resource, rows = count, "resource refreshed");
        Ok(count)
    }
}

impl<T> ResourceSlot<T> {
    /// Which resource this slot holds.
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The server path this slot fetches.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The current rows.
    pub fn rows(&self) -> &[T] {
        &self.payload
    }

    /// A shared handle on the current rows that survives later fetches.
    pub fn shared(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.payload)
    }

    /// Drop every row.
    ///
    /// For lists where "no rows" is a real answer rather than "not yet".
    pub fn clear(&mut self) {
        self.payload = Arc::new(Vec::new());
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the slot holds no rows.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
