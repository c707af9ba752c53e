//! Error types for the client core.
//!
//! Uses `thiserror` for typed errors that surface through the whole
//! pipeline: remote transport, per-resource fetches, whole-snapshot
//! refreshes, and the operations built on top of them.

use capfront_types::UnknownStage;

use crate::slot::ResourceKind;

/// Failure of a single round trip to the remote simulation server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server could not be reached or did not answer in time.
    #[error("server unavailable: {0}")]
    Unavailable(String),

    /// The server answered with a non-200 status.
    #[error("server rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
}

/// Why a [`ResourceSlot`](crate::slot::ResourceSlot) fetch left its payload unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// The round trip itself failed.
    #[error("{resource}: {source}")]
    Remote {
        /// The resource being fetched.
        resource: ResourceKind,
        /// The transport failure.
        #[source]
        source: RemoteError,
    },

    /// The server answered with a zero-length body.
    #[error("{resource}: the server response was empty")]
    EmptyBody {
        /// The resource being fetched.
        resource: ResourceKind,
    },

    /// The server answered with an empty table (`[]`): no rows yet.
    #[error("{resource}: the server sent an empty table")]
    NoRows {
        /// The resource being fetched.
        resource: ResourceKind,
    },

    /// The body was not a list of the slot's element type.
    #[error("{resource}: could not decode the server response: {source}")]
    Decode {
        /// The resource being fetched.
        resource: ResourceKind,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
        /// The raw body, for diagnostics.
        body: String,
    },
}

impl SlotError {
    /// The resource whose fetch failed.
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::Remote { resource, .. }
            | Self::EmptyBody { resource }
            | Self::NoRows { resource }
            | Self::Decode { resource, .. } => *resource,
        }
    }

    /// Whether this is information ("no data yet") rather than a failure.
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::EmptyBody { .. } | Self::NoRows { .. })
    }
}

/// One or more slots of a snapshot failed to refresh.
///
/// Every slot was still attempted; the ones not listed here were replaced.
#[derive(Debug, thiserror::Error)]
#[error("{} of {} resources failed to refresh", .failures.len(), ResourceKind::ALL.len())]
pub struct SnapshotError {
    /// The failed slots, in snapshot key order.
    pub failures: Vec<SlotError>,
}

impl SnapshotError {
    /// Whether every failure was informational (empty tables only).
    pub fn is_informational(&self) -> bool {
        self.failures.iter().all(SlotError::is_informational)
    }

    /// The resources that failed.
    pub fn resources(&self) -> Vec<ResourceKind> {
        self.failures.iter().map(SlotError::resource).collect()
    }
}

/// Errors from the client operations built on top of the cache.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A request named a user that is not in the local directory.
    #[error("user {0} is not in the local directory")]
    UnknownUser(String),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A remote reply could not be decoded.
    #[error("could not decode {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
        /// The raw body, for diagnostics.
        body: String,
    },

    /// A snapshot refresh failed in a way that was not merely "no data yet".
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The server refused to let this session hold the user.
    #[error("the server refused to lock user {0}")]
    LockDenied(String),

    /// A request named an action outside the circuit.
    #[error(transparent)]
    InvalidAction(#[from] UnknownStage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn informational_slot_errors() {
        assert!(SlotError::NoRows { resource: ResourceKind::Trace }.is_informational());
        assert!(SlotError::EmptyBody { resource: ResourceKind::Commodities }.is_informational());
        let remote = SlotError::Remote {
            resource: ResourceKind::Industries,
            source: RemoteError::Unavailable(String::from("down")),
        };
        assert!(!remote.is_informational());
        assert_eq!(remote.resource(), ResourceKind::Industries);
    }

    #[test]
    fn snapshot_error_is_informational_only_if_all_are() {
        let quiet = SnapshotError {
            failures: vec![SlotError::NoRows { resource: ResourceKind::Trace }],
        };
        assert!(quiet.is_informational());

        let loud = SnapshotError {
            failures: vec![
                SlotError::NoRows { resource: ResourceKind::Trace },
                SlotError::Remote {
                    resource: ResourceKind::Classes,
                    source: RemoteError::Rejected {
                        status: 500,
                        body: String::from("boom"),
                    },
                },
            ],
        };
        assert!(!loud.is_informational());
        assert_eq!(loud.resources(), vec![ResourceKind::Trace, ResourceKind::Classes]);
        assert_eq!(loud.to_string(), "2 of 7 resources failed to refresh");
    }
}
