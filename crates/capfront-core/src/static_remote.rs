//! An in-memory simulation server.
//!
//! [`StaticRemote`] answers `GET` paths from a table of canned responses and
//! records every call it receives. Tests use it to script a server; it can
//! also replay captured responses without a network. Clones share the same
//! table, so a test can keep a handle and change answers between requests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::error::RemoteError;
use crate::remote::CallClass;

/// A canned answer for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CannedResponse {
    /// A 200 reply with this body.
    Ok(Vec<u8>),
    /// A non-200 reply with this status and body.
    Status(u16, String),
    /// The server cannot be reached.
    Unavailable,
}

/// One call received by a [`StaticRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Requested path, relative to the base URL.
    pub path: String,
    /// The `x-api-key` the caller sent (empty for none).
    pub credential: String,
    /// The call's timeout class.
    pub class: CallClass,
}

#[derive(Debug, Default)]
struct Table {
    responses: BTreeMap<String, CannedResponse>,
    calls: Vec<RecordedCall>,
}

/// Canned simulation server.
#[derive(Debug, Clone, Default)]
pub struct StaticRemote {
    table: Arc<Mutex<Table>>,
}

impl StaticRemote {
    /// Create a server that answers every path with 404.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<R>(&self, f: impl FnOnce(&mut Table) -> R) -> R {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut table)
    }

    /// Answer `path` with `value` serialized as JSON.
    pub fn respond_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.respond_raw(path, body);
    }

    /// Answer `path` with a raw 200 body.
    pub fn respond_raw(&self, path: &str, body: Vec<u8>) {
        self.set(path, CannedResponse::Ok(body));
    }

    /// Answer `path` with a non-200 status.
    pub fn respond_status(&self, path: &str, status: u16, body: &str) {
        self.set(path, CannedResponse::Status(status, body.to_owned()));
    }

    /// Make `path` unreachable.
    pub fn set_unavailable(&self, path: &str) {
        self.set(path, CannedResponse::Unavailable);
    }

    /// Install an arbitrary canned response.
    pub fn set(&self, path: &str, response: CannedResponse) {
        self.with_table(|table| {
            table.responses.insert(path.to_owned(), response);
        });
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.with_table(|table| table.calls.clone())
    }

    /// How many times `path` has been requested.
    pub fn call_count(&self, path: &str) -> usize {
        self.with_table(|table| table.calls.iter().filter(|c| c.path == path).count())
    }

    /// Forget the recorded calls, keeping the responses.
    pub fn clear_calls(&self) {
        self.with_table(|table| table.calls.clear());
    }

    pub(crate) fn get(
        &self,
        path: &str,
        credential: &str,
        class: CallClass,
    ) -> Result<Vec<u8>, RemoteError> {
        self.with_table(|table| {
            table.calls.push(RecordedCall {
                path: path.to_owned(),
                credential: credential.to_owned(),
                class,
            });
            match table.responses.get(path) {
                Some(CannedResponse::Ok(body)) => Ok(body.clone()),
                Some(CannedResponse::Status(status, body)) => Err(RemoteError::Rejected {
                    status: *status,
                    body: body.clone(),
                }),
                Some(CannedResponse::Unavailable) => {
                    Err(RemoteError::Unavailable(format!("{path} is unavailable")))
                }
                None => Err(RemoteError::Rejected {
                    status: 404,
                    body: format!("no canned response for {path}"),
                }),
            }
        })
    }
}
