//! Advancing a simulation one stage around the circuit.
//!
//! An action asks the server to carry out the current stage, then appends
//! a fresh snapshot to the user's timeline and fills it from the server.
//! The new stage is first guessed from the fixed circuit and then replaced
//! by whatever the refreshed snapshot reports.

use serde::Serialize;
use tracing::{info, warn};

use capfront_types::{Action, ActionState};

use crate::client::SimulationClient;
use crate::remote::CallClass;
use crate::user::User;

/// Display pages it is safe to send a user back to after an action.
pub const REDISPLAY_ROUTES: [&str; 8] = [
    "/commodities",
    "/industries",
    "/classes",
    "/stocks",
    "/industry_stocks",
    "/class_stocks",
    "/trace",
    "/",
];

/// Where to send a user after an action, given the last page they saw.
pub fn redirect_target(last_visited: Option<&str>) -> &'static str {
    last_visited
        .and_then(|route| REDISPLAY_ROUTES.iter().find(|known| **known == route))
        .copied()
        .unwrap_or("/")
}

/// What happened when an action was performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// The action requested.
    pub action: Action,
    /// Why the server did not accept the action, if it did not.
    pub dispatch_error: Option<String>,
    /// Why the new snapshot could not be fully refreshed, if it could not.
    pub refresh_error: Option<String>,
    /// Index of the snapshot the action produced.
    pub step: usize,
    /// The stage the circuit table predicts.
    pub guessed_state: ActionState,
    /// The stage now recorded for the user.
    pub state: ActionState,
    /// Page to show next.
    pub redirect: &'static str,
}

impl ActionReport {
    /// Whether both the action and the refresh went through.
    pub const fn is_clean(&self) -> bool {
        self.dispatch_error.is_none() && self.refresh_error.is_none()
    }
}

impl SimulationClient {
    /// Ask the server to perform `action` for `user` and record the result.
    ///
    /// A new snapshot is appended and refreshed even when the server
    /// rejects the action, so the timeline always shows what the server
    /// holds afterwards.
    pub async fn perform_action(&self, user: &mut User, action: Action) -> ActionReport {
        info!(username = %user.name, %action, "performing action");

        let dispatch_error = match self
            .remote()
            .get(&format!("action/{}", action.name()), &user.credential, CallClass::Data)
            .await
        {
            Ok(_) => None,
            Err(e) => {
                warn!(username = %user.name, %action, error = %e, "server did not complete the action");
                Some(e.to_string())
            }
        };

        let snapshot = user.blank_snapshot();
        user.timeline.append(snapshot);
        let refresh_error = match user.timeline.current_mut().fetch_all(self.remote()).await {
            Err(e) if !e.is_informational() => {
                warn!(username = %user.name, %action, error = %e, "action results not fully refreshed");
                Some(e.to_string())
            }
            _ => None,
        };

        let guessed_state = action.resulting_state();
        user.cached_state = guessed_state;
        if let Some(reported) = user
            .timeline
            .current()
            .reported_state(user.remote_simulation_id)
        {
            if reported != guessed_state {
                warn!(
                    username = %user.name,
                    guessed = %guessed_state,
                    reported = %reported,
                    "server state differs from the circuit table"
                );
            }
            user.cached_state = reported;
        }

        let report = ActionReport {
            action,
            dispatch_error,
            refresh_error,
            step: user.timeline.current_step(),
            guessed_state,
            state: user.cached_state,
            redirect: redirect_target(user.last_visited_route.as_deref()),
        };
        info!(
            username = %user.name,
            step = report.step,
            state = %report.state,
            redirect = report.redirect,
            "action recorded"
        );
        report
    }
}
