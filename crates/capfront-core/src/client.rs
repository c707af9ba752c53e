//! The client context every operation runs against.
//!
//! [`SimulationClient`] bundles the remote source, the user directory, the
//! administrator's credential and the template list. Reconciliation,
//! actions and the simulation lifecycle are methods on it, defined in their
//! own modules.

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;

use capfront_types::SimulationTemplate;

use crate::error::{CoreError, RemoteError};
use crate::registry::UserRegistry;
use crate::remote::{CallClass, RemoteSource};

/// Shared client state.
#[derive(Debug)]
pub struct SimulationClient {
    remote: RemoteSource,
    registry: UserRegistry,
    admin_key: String,
    templates: RwLock<Vec<SimulationTemplate>>,
}

impl SimulationClient {
    /// A client with an empty directory and no templates.
    pub fn new(remote: RemoteSource, admin_key: &str) -> Self {
        Self {
            remote,
            registry: UserRegistry::new(),
            admin_key: admin_key.to_owned(),
            templates: RwLock::new(Vec::new()),
        }
    }

    /// The remote source.
    pub const fn remote(&self) -> &RemoteSource {
        &self.remote
    }

    /// The user directory.
    pub const fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    pub(crate) fn admin_key(&self) -> &str {
        &self.admin_key
    }

    /// The templates loaded at startup.
    pub async fn templates(&self) -> Vec<SimulationTemplate> {
        self.templates.read().await.clone()
    }

    pub(crate) async fn set_templates(&self, templates: Vec<SimulationTemplate>) {
        *self.templates.write().await = templates;
    }

    /// Check that the server answers at all.
    ///
    /// # Errors
    ///
    /// Returns the [`RemoteError`] if the base URL does not answer 200.
    pub async fn probe(&self) -> Result<(), RemoteError> {
        self.remote.get("", "", CallClass::Probe).await.map(|_| ())
    }

    /// `GET` a path and decode the body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: &str,
        what: &'static str,
    ) -> Result<T, CoreError> {
        let body = self.remote.get(path, credential, CallClass::Data).await?;
        serde_json::from_slice(&body).map_err(|source| {
            let body = String::from_utf8_lossy(&body).into_owned();
            debug!(what, path, body, "response did not decode");
            CoreError::Decode { what, source, body }
        })
    }
}
