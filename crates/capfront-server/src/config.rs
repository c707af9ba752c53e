//! Configuration for the display server.
//!
//! Everything comes from environment variables. Only the administrator's
//! API key is required; the rest default to a simulation server on the
//! local machine.

use std::time::Duration;

use capfront_core::RemoteConfig;
use capfront_core::remote::DEFAULT_API_SOURCE;

use crate::server::ServerError;

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How to reach the simulation server.
    pub remote: RemoteConfig,
    /// The administrator's API key, used for directory and lock lookups.
    pub admin_key: String,
    /// The user allowed to see the admin pages.
    pub admin_user: String,
    /// The user assumed when a request names none.
    pub default_user: Option<String>,
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `CAPFRONT_ADMIN_KEY` -- the administrator's API key
    ///
    /// Optional variables:
    /// - `CAPFRONT_API_SOURCE` -- simulation server base URL (default `http://127.0.0.1:8000/`)
    /// - `CAPFRONT_ADMIN_USER` -- name of the administrator (default `admin`)
    /// - `CAPFRONT_DEFAULT_USER` -- user assumed when a request names none
    /// - `CAPFRONT_HOST` -- bind address (default `0.0.0.0`)
    /// - `CAPFRONT_PORT` -- bind port (default `8080`)
    /// - `PROBE_TIMEOUT_MS` -- liveness probe timeout (default 2000)
    /// - `FETCH_TIMEOUT_MS` -- data fetch timeout (default 5000)
    pub fn from_env() -> Result<Self, ServerError> {
        let admin_key = std::env::var("CAPFRONT_ADMIN_KEY").map_err(|e| {
            ServerError::Config(format!("missing required env var CAPFRONT_ADMIN_KEY: {e}"))
        })?;

        let api_source =
            std::env::var("CAPFRONT_API_SOURCE").unwrap_or_else(|_| DEFAULT_API_SOURCE.to_owned());
        let admin_user =
            std::env::var("CAPFRONT_ADMIN_USER").unwrap_or_else(|_| "admin".to_owned());
        let default_user = std::env::var("CAPFRONT_DEFAULT_USER")
            .ok()
            .filter(|name| !name.trim().is_empty());
        let host = std::env::var("CAPFRONT_HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());

        let port: u16 = std::env::var("CAPFRONT_PORT")
            .unwrap_or_else(|_| "8080".to_owned())
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid CAPFRONT_PORT: {e}")))?;

        let probe_timeout_ms: u64 = std::env::var("PROBE_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_owned())
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid PROBE_TIMEOUT_MS: {e}")))?;

        let fetch_timeout_ms: u64 = std::env::var("FETCH_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_owned())
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid FETCH_TIMEOUT_MS: {e}")))?;

        Ok(Self {
            remote: RemoteConfig::new(
                &api_source,
                Duration::from_millis(probe_timeout_ms),
                Duration::from_millis(fetch_timeout_ms),
            ),
            admin_key,
            admin_user,
            default_user,
            host,
            port,
        })
    }
}
