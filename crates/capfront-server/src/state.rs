//! Shared application state for the display API.

use capfront_core::SimulationClient;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. Per-user locking lives inside the client's registry.
#[derive(Debug)]
pub struct AppState {
    /// The simulation client every handler runs against.
    pub client: SimulationClient,
    /// The user assumed when a request names none.
    pub default_user: Option<String>,
    /// The user allowed to see the admin pages.
    pub admin_user: String,
}

impl AppState {
    /// Create the application state.
    pub const fn new(
        client: SimulationClient,
        default_user: Option<String>,
        admin_user: String,
    ) -> Self {
        Self {
            client,
            default_user,
            admin_user,
        }
    }
}
