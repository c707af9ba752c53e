//! Cross-checking the local cache against the server before each request.
//!
//! The server is the source of truth for which simulation a user is on and
//! whether this client holds the user's lock. [`SimulationClient::reconcile`]
//! runs before every read: it confirms the server is alive, confirms the
//! lock with an administrator lookup, and resynchronizes the newest
//! snapshot when the local simulation id has drifted.

use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use capfront_types::UserRecord;

use crate::client::SimulationClient;
use crate::error::CoreError;
use crate::user::User;

/// Why a request is being sent back to the login page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DivertReason {
    /// No user is attached to the request.
    #[error("no user is logged in")]
    NoIdentity,

    /// The administrator lookup of the user failed.
    #[error("could not confirm the user with the server: {0}")]
    LookupFailed(String),

    /// The server says this client does not hold the user.
    #[error("the server does not consider this user logged in")]
    NotLocked,

    /// The user's simulation could not be refreshed.
    #[error("could not resynchronize with the server: {0}")]
    ResyncFailed(String),

    /// The server refused to lock the user.
    #[error("the server refused to lock the user")]
    LockDenied,
}

/// Outcome of [`SimulationClient::reconcile`].
#[derive(Debug)]
pub enum Reconciliation {
    /// Carry on, holding exclusive access to the user.
    Proceed(OwnedMutexGuard<User>),
    /// Send the caller to the login page.
    DivertToLogin(DivertReason),
    /// Nothing local can be trusted; fail the request.
    Fatal(CoreError),
}

impl SimulationClient {
    /// Confirm `identity` against the server and bring its cache up to date.
    ///
    /// `route` is recorded as the user's last visited page when given;
    /// callers pass it only for display pages.
    pub async fn reconcile(&self, identity: Option<&str>, route: Option<&str>) -> Reconciliation {
        if let Err(e) = self.probe().await {
            warn!(error = %e, "simulation server did not answer the probe");
            return Reconciliation::Fatal(e.into());
        }

        let Some(name) = identity else {
            return Reconciliation::DivertToLogin(DivertReason::NoIdentity);
        };

        let Some(handle) = self.registry().get(name).await else {
            warn!(username = name, "request names a user missing from the directory");
            return Reconciliation::Fatal(CoreError::UnknownUser(name.to_owned()));
        };
        let mut user = handle.lock_owned().await;

        let record: UserRecord = match self
            .get_json(&format!("admin/user/{name}"), self.admin_key(), "user record")
            .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(username = name, error = %e, "administrator lookup failed");
                return Reconciliation::DivertToLogin(DivertReason::LookupFailed(e.to_string()));
            }
        };

        if !record.is_locked {
            info!(username = name, "server reports user is not locked");
            user.locked = false;
            return Reconciliation::DivertToLogin(DivertReason::NotLocked);
        }
        user.locked = true;

        let drifted = user.remote_simulation_id != record.current_simulation_id;
        let has_simulation = record.current_simulation_id.into_inner() != 0;
        if drifted || (has_simulation && !user.timeline.current().is_populated()) {
            info!(
                username = name,
                local = %user.remote_simulation_id,
                remote = %record.current_simulation_id,
                "resynchronizing with server"
            );
            if has_simulation {
                if let Err(e) = user.timeline.current_mut().fetch_all(self.remote()).await {
                    if !e.is_informational() {
                        warn!(username = name, error = %e, "resync failed");
                        return Reconciliation::DivertToLogin(DivertReason::ResyncFailed(
                            e.to_string(),
                        ));
                    }
                }
            }
            user.remote_simulation_id = record.current_simulation_id;
            if let Some(state) = user
                .timeline
                .current()
                .reported_state(record.current_simulation_id)
            {
                user.cached_state = state;
            }
            // Steps from another simulation are never diffed against.
            if drifted {
                user.timeline.collapse_to_latest();
            } else {
                user.timeline.view_latest();
            }
        }

        if let Some(route) = route {
            user.last_visited_route = Some(route.to_owned());
        }

        Reconciliation::Proceed(user)
    }
}

#[cfg(test)]
mod tests {
    use capfront_types::{ActionState, SimulationId};

    use super::*;
    use crate::remote::RemoteSource;
    use crate::snapshot::Snapshot;
    use crate::static_remote::StaticRemote;

    async fn client_with(canned: &StaticRemote, user: User) -> SimulationClient {
        canned.respond_raw("", b"{}".to_vec());
        let client = SimulationClient::new(RemoteSource::from(canned.clone()), "admin-key");
        client.registry().insert(user).await;
        client
    }

    fn script_data(canned: &StaticRemote, sim: i64) {
        canned.respond_json(
            "simulations/current",
            &serde_json::json!([{"id": sim, "state": "PRODUCE"}]),
        );
        canned.respond_json("commodity", &serde_json::json!([{"id": 1, "size": 10}]));
        canned.respond_json("industry", &serde_json::json!([{"id": 1}]));
        canned.respond_json("classes", &serde_json::json!([{"id": 1}]));
        canned.respond_json("stocks/industry", &serde_json::json!([{"id": 1}]));
        canned.respond_json("stocks/class", &serde_json::json!([{"id": 1}]));
        canned.respond_json("trace", &serde_json::json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn dead_server_is_fatal() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        canned.set_unavailable("");
        let outcome = client.reconcile(Some("amy"), None).await;
        assert!(matches!(outcome, Reconciliation::Fatal(CoreError::Remote(_))));
    }

    #[tokio::test]
    async fn missing_identity_diverts() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        let outcome = client.reconcile(None, None).await;
        assert!(matches!(
            outcome,
            Reconciliation::DivertToLogin(DivertReason::NoIdentity)
        ));
    }

    #[tokio::test]
    async fn unknown_identity_is_fatal() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        let outcome = client.reconcile(Some("mallory"), None).await;
        assert!(matches!(outcome, Reconciliation::Fatal(CoreError::UnknownUser(_))));
    }

    #[tokio::test]
    async fn unlocked_user_diverts_and_clears_flag() {
        let canned = StaticRemote::new();
        let mut user = User::new("amy", "a");
        user.locked = true;
        let client = client_with(&canned, user).await;
        canned.respond_json(
            "admin/user/amy",
            &serde_json::json!({"username": "amy", "current_simulation_id": 1, "is_locked": false}),
        );

        let outcome = client.reconcile(Some("amy"), None).await;
        assert!(matches!(
            outcome,
            Reconciliation::DivertToLogin(DivertReason::NotLocked)
        ));
        let locked = match client.registry().get("amy").await {
            Some(handle) => handle.lock().await.locked,
            None => true,
        };
        assert!(!locked);
    }

    #[tokio::test]
    async fn failed_lookup_diverts() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        canned.respond_status("admin/user/amy", 404, "no such user");
        let outcome = client.reconcile(Some("amy"), None).await;
        assert!(matches!(
            outcome,
            Reconciliation::DivertToLogin(DivertReason::LookupFailed(_))
        ));
    }

    #[tokio::test]
    async fn drift_triggers_resync_and_records_route() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        canned.respond_json(
            "admin/user/amy",
            &serde_json::json!({"username": "amy", "current_simulation_id": 8, "is_locked": true}),
        );
        script_data(&canned, 8);

        let outcome = client.reconcile(Some("amy"), Some("/commodities")).await;
        let user = match outcome {
            Reconciliation::Proceed(user) => user,
            other => panic!("expected to proceed, got {other:?}"),
        };
        assert_eq!(user.remote_simulation_id, SimulationId::new(8));
        assert!(user.timeline.current().is_populated());
        assert_eq!(user.state(), ActionState::Produce);
        assert_eq!(user.last_visited_route.as_deref(), Some("/commodities"));
        drop(user);

        // Second pass: already in sync, no refetch.
        canned.clear_calls();
        let outcome = client.reconcile(Some("amy"), None).await;
        assert!(matches!(outcome, Reconciliation::Proceed(_)));
        assert_eq!(canned.call_count("commodity"), 0);
    }

    #[tokio::test]
    async fn switching_simulation_resets_comparator() {
        let canned = StaticRemote::new();
        let mut user = User::new("amy", "a");
        user.remote_simulation_id = SimulationId::new(3);
        user.timeline.append(Snapshot::new("a"));
        user.timeline.append(Snapshot::new("a"));
        user.timeline.compare_with(0);
        let client = client_with(&canned, user).await;
        canned.respond_json(
            "admin/user/amy",
            &serde_json::json!({"username": "amy", "current_simulation_id": 8, "is_locked": true}),
        );
        script_data(&canned, 8);

        let outcome = client.reconcile(Some("amy"), None).await;
        let cursors = match outcome {
            Reconciliation::Proceed(user) => user.timeline.cursors(),
            other => panic!("expected to proceed, got {other:?}"),
        };
        assert_eq!(cursors.current_step, 2);
        assert_eq!(cursors.viewed_step, 2);
        assert_eq!(cursors.comparator_step, 2);
    }

    #[tokio::test]
    async fn failed_resync_diverts() {
        let canned = StaticRemote::new();
        let client = client_with(&canned, User::new("amy", "a")).await;
        canned.respond_json(
            "admin/user/amy",
            &serde_json::json!({"username": "amy", "current_simulation_id": 8, "is_locked": true}),
        );
        let outcome = client.reconcile(Some("amy"), None).await;
        assert!(matches!(
            outcome,
            Reconciliation::DivertToLogin(DivertReason::ResyncFailed(_))
        ));
    }
}
