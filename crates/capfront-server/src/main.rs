//! Entry point for the Capfront display server.
//!
//! Loads configuration from the environment, fetches the user directory and
//! template list from the simulation server, then serves the display API.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use capfront_server::{ServerConfig, build_state, start_server};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup loading, or serving fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("capfront-server starting");

    let config = ServerConfig::from_env()?;
    info!(
        api_source = config.remote.api_source,
        admin_user = config.admin_user,
        default_user = config.default_user.as_deref().unwrap_or("-"),
        probe_timeout_ms = config.remote.probe_timeout.as_millis(),
        fetch_timeout_ms = config.remote.fetch_timeout.as_millis(),
        "configuration loaded"
    );

    let state = build_state(&config).await?;
    info!(
        users = state.client.registry().len().await,
        "user directory ready"
    );

    start_server(&config, Arc::new(state)).await?;

    Ok(())
}
