//! A user of the simulation server and everything cached on their behalf.

use serde::Serialize;

use capfront_types::{ActionState, Simulation, SimulationId, UserRecord};

use crate::slot::{ResourceKind, ResourceSlot};
use crate::snapshot::Snapshot;
use crate::timeline::Timeline;

/// Endpoint listing every simulation a user owns.
pub const USER_SIMULATIONS_ENDPOINT: &str = "simulations/";

/// One user's session state.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user name.
    pub name: String,
    /// The user's API key.
    pub credential: String,
    /// The simulation this client believes the user is working on.
    pub remote_simulation_id: SimulationId,
    /// Whether this client holds the user's lock. Advisory; the server decides.
    pub locked: bool,
    /// The last display route the user visited.
    pub last_visited_route: Option<String>,
    /// Locally tracked stage, used when no snapshot reports one.
    pub cached_state: ActionState,
    /// Snapshot history.
    pub timeline: Timeline,
    /// All of the user's simulations, for the dashboard.
    pub simulations: ResourceSlot<Simulation>,
}

impl User {
    /// A user with an empty timeline.
    pub fn new(name: &str, credential: &str) -> Self {
        Self {
            name: name.to_owned(),
            credential: credential.to_owned(),
            remote_simulation_id: SimulationId::default(),
            locked: false,
            last_visited_route: None,
            cached_state: ActionState::Demand,
            timeline: Timeline::new(Snapshot::new(credential)),
            simulations: ResourceSlot::with_endpoint(
                ResourceKind::Simulations,
                USER_SIMULATIONS_ENDPOINT,
                credential,
            ),
        }
    }

    /// Build a user from an administrative directory record.
    pub fn from_record(record: &UserRecord) -> Self {
        let mut user = Self::new(&record.username, &record.api_key);
        user.remote_simulation_id = record.current_simulation_id;
        user.locked = record.is_locked;
        user
    }

    /// A fresh empty snapshot bound to this user's credential.
    pub fn blank_snapshot(&self) -> Snapshot {
        Snapshot::new(&self.credential)
    }

    /// The simulation's stage: as the newest snapshot reports it, else as cached.
    pub fn state(&self) -> ActionState {
        self.timeline
            .current()
            .reported_state(self.remote_simulation_id)
            .unwrap_or(self.cached_state)
    }

    /// Whether the user has a simulation to look at.
    pub const fn has_simulation(&self) -> bool {
        self.remote_simulation_id.into_inner() != 0
    }

    /// A lightweight description for directory listings.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.name.clone(),
            simulation_id: self.remote_simulation_id,
            locked: self.locked,
            state: self.state(),
            current_step: self.timeline.current_step(),
        }
    }
}

/// What the admin dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// Unique user name.
    pub username: String,
    /// The simulation the user is working on.
    pub simulation_id: SimulationId,
    /// Whether this client holds the user's lock.
    pub locked: bool,
    /// The simulation's stage.
    pub state: ActionState,
    /// Index of the newest snapshot.
    pub current_step: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_record_copies_directory_fields() {
        let record = UserRecord {
            username: String::from("alice"),
            api_key: String::from("a-key"),
            current_simulation_id: SimulationId::new(5),
            is_locked: true,
        };
        let user = User::from_record(&record);
        assert_eq!(user.name, "alice");
        assert_eq!(user.credential, "a-key");
        assert_eq!(user.remote_simulation_id, SimulationId::new(5));
        assert!(user.locked);
        assert!(user.has_simulation());
        assert_eq!(user.timeline.len(), 1);
        assert_eq!(user.simulations.endpoint(), USER_SIMULATIONS_ENDPOINT);
    }

    #[test]
    fn state_falls_back_to_cache() {
        let mut user = User::new("bob", "b-key");
        user.cached_state = ActionState::Consume;
        assert_eq!(user.state(), ActionState::Consume);
        assert_eq!(user.summary().state, ActionState::Consume);
        assert!(!user.has_simulation());
    }
}
