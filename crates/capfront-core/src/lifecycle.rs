//! Users and simulations coming and going.
//!
//! Startup loads the user directory and the template list with the
//! administrator's key. After that a user locks themselves on the server,
//! creates simulations from templates, deletes them, and unlocks on quit.

use serde::Serialize;
use tracing::{info, warn};

use capfront_types::{CloneResult, Simulation, SimulationId, SimulationTemplate, TemplateId, UserRecord};

use crate::client::SimulationClient;
use crate::error::{CoreError, RemoteError, SlotError};
use crate::remote::CallClass;
use crate::user::{User, UserSummary};

/// Everything the user dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// The user's simulations.
    pub simulations: Vec<Simulation>,
    /// Templates a new simulation can be cloned from.
    pub templates: Vec<SimulationTemplate>,
}

impl SimulationClient {
    /// Fill the directory from the server's user list.
    ///
    /// Returns the number of users added.
    pub async fn load_directory(&self) -> Result<usize, CoreError> {
        let records: Vec<UserRecord> = self
            .get_json("admin/users", self.admin_key(), "user directory")
            .await?;

        let mut added = 0_usize;
        for record in &records {
            if self.registry().insert(User::from_record(record)).await {
                added = added.saturating_add(1);
            }
        }
        info!(users = added, "user directory loaded");
        Ok(added)
    }

    /// Fetch the templates new simulations are cloned from.
    ///
    /// Returns the number of templates loaded.
    pub async fn load_templates(&self) -> Result<usize, CoreError> {
        let templates: Vec<SimulationTemplate> = self
            .get_json("templates/templates", self.admin_key(), "template list")
            .await?;
        let count = templates.len();
        self.set_templates(templates).await;
        info!(templates = count, "templates loaded");
        Ok(count)
    }

    /// Ask the server to let this client hold user `name`.
    pub async fn select_user(&self, name: &str) -> Result<(), CoreError> {
        let mut user = self
            .registry()
            .lock(name)
            .await
            .ok_or_else(|| CoreError::UnknownUser(name.to_owned()))?;

        match self
            .remote()
            .get(&format!("users/lock/{name}"), &user.credential, CallClass::Data)
            .await
        {
            Ok(_) => {
                user.locked = true;
                info!(username = name, "user locked");
                Ok(())
            }
            Err(RemoteError::Rejected { status, body }) => {
                warn!(username = name, status, body, "server refused the lock");
                Err(CoreError::LockDenied(name.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Release `user` on the server.
    ///
    /// The local flag is cleared even if the server cannot be told.
    pub async fn quit(&self, user: &mut User) -> Result<(), RemoteError> {
        user.locked = false;
        let result = self
            .remote()
            .get(&format!("users/unlock/{}", user.name), &user.credential, CallClass::Data)
            .await
            .map(|_| ());
        match &result {
            Ok(()) => info!(username = %user.name, "user unlocked"),
            Err(e) => warn!(username = %user.name, error = %e, "server was not told about the quit"),
        }
        result
    }

    /// Clone `template` into a new simulation and make it the user's current one.
    ///
    /// The new simulation gets a fresh snapshot which is both viewed and
    /// compared, so nothing is diffed against the previous simulation.
    pub async fn create_simulation(
        &self,
        user: &mut User,
        template: TemplateId,
    ) -> Result<SimulationId, CoreError> {
        info!(username = %user.name, %template, "creating simulation");
        let result: CloneResult = self
            .get_json(&format!("clone/{template}"), &user.credential, "clone result")
            .await?;

        user.remote_simulation_id = result.simulation_id;
        let snapshot = user.blank_snapshot();
        user.timeline.append(snapshot);
        if let Err(e) = user.timeline.current_mut().fetch_all(self.remote()).await {
            if !e.is_informational() {
                warn!(
                    username = %user.name,
                    simulation = %result.simulation_id,
                    error = %e,
                    "simulation created but not fully retrieved"
                );
            }
        }
        if let Some(state) = user.timeline.current().reported_state(result.simulation_id) {
            user.cached_state = state;
        }
        user.timeline.collapse_to_latest();
        self.refresh_simulations(user).await;

        info!(
            username = %user.name,
            simulation = %result.simulation_id,
            step = user.timeline.current_step(),
            "simulation created"
        );
        Ok(result.simulation_id)
    }

    /// Delete one of the user's simulations and refresh their list.
    pub async fn delete_simulation(&self, user: &mut User, id: SimulationId) -> Result<(), CoreError> {
        info!(username = %user.name, simulation = %id, "deleting simulation");
        self.remote()
            .get(&format!("simulations/delete/{id}"), &user.credential, CallClass::Data)
            .await?;
        self.refresh_simulations(user).await;
        Ok(())
    }

    /// The user's simulations, freshly fetched, and the templates.
    pub async fn dashboard(&self, user: &mut User) -> Dashboard {
        self.refresh_simulations(user).await;
        Dashboard {
            simulations: user.simulations.rows().to_vec(),
            templates: self.templates().await,
        }
    }

    /// Every user the directory knows about.
    pub async fn admin_dashboard(&self) -> Vec<UserSummary> {
        self.registry().summaries().await
    }

    /// Ask the server to reset its whole database.
    pub async fn admin_reset(&self) -> Result<(), CoreError> {
        self.remote()
            .get("action/reset", self.admin_key(), CallClass::Data)
            .await?;
        warn!("server database reset by the administrator");
        Ok(())
    }

    /// Refresh the user's simulation list; an empty table empties the list.
    async fn refresh_simulations(&self, user: &mut User) {
        match user.simulations.fetch(self.remote()).await {
            Ok(_) => {}
            Err(SlotError::NoRows { .. } | SlotError::EmptyBody { .. }) => user.simulations.clear(),
            Err(e) => warn!(username = %user.name, error = %e, "simulation list not refreshed"),
        }
    }
}
