//! Display server lifecycle management.
//!
//! [`build_state`] turns a [`ServerConfig`] into a ready client: HTTP
//! remote, user directory and template list loaded. [`start_server`] binds
//! and serves until the process is terminated.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use capfront_core::{HttpRemote, RemoteSource, SimulationClient};

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

/// Build the application state, loading the directory and templates.
///
/// # Errors
///
/// Returns [`ServerError::Startup`] if the simulation server cannot supply
/// the user directory or the template list.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let remote = HttpRemote::new(config.remote.clone())
        .map_err(|e| ServerError::Startup(format!("remote setup failed: {e}")))?;
    info!(api_source = remote.api_source(), "simulation server configured");

    let client = SimulationClient::new(RemoteSource::from(remote), &config.admin_key);
    client
        .load_directory()
        .await
        .map_err(|e| ServerError::Startup(format!("could not load users: {e}")))?;
    client
        .load_templates()
        .await
        .map_err(|e| ServerError::Startup(format!("could not load templates: {e}")))?;

    Ok(AppState::new(
        client,
        config.default_user.clone(),
        config.admin_user.clone(),
    ))
}

/// Start the display HTTP server.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "display server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Errors that can occur when configuring, starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An environment variable was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The simulation server could not supply startup data.
    #[error("startup error: {0}")]
    Startup(String),

    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
