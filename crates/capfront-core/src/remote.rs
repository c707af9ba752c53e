//! The remote simulation server as seen by the client.
//!
//! Every remote interaction is a `GET <base><path>` carrying the caller's
//! API key. [`RemoteSource`] is an enum rather than a trait object because
//! its one method is async; the `Http` variant talks to a real server and
//! the `Static` variant answers from canned responses held in memory.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::RemoteError;
use crate::static_remote::StaticRemote;

/// Default base URL of the simulation server.
pub const DEFAULT_API_SOURCE: &str = "http://127.0.0.1:8000/";

/// User agent sent with every request.
const USER_AGENT: &str = "Capitalism reader";

/// Which timeout applies to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallClass {
    /// Liveness checks: short timeout, no credential.
    Probe,
    /// Data fetches, admin lookups, and actions.
    Data,
}

/// Where the server lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL, always ending in `/`.
    pub api_source: String,
    /// Timeout for [`CallClass::Probe`] calls.
    pub probe_timeout: Duration,
    /// Timeout for [`CallClass::Data`] calls.
    pub fetch_timeout: Duration,
}

impl RemoteConfig {
    /// Build a config, normalizing the base URL to end in `/`.
    pub fn new(api_source: &str, probe_timeout: Duration, fetch_timeout: Duration) -> Self {
        let mut api_source = api_source.trim().to_owned();
        if !api_source.ends_with('/') {
            api_source.push('/');
        }
        Self {
            api_source,
            probe_timeout,
            fetch_timeout,
        }
    }

    /// The timeout that applies to a call of the given class.
    pub const fn timeout_for(&self, class: CallClass) -> Duration {
        match class {
            CallClass::Probe => self.probe_timeout,
            CallClass::Data => self.fetch_timeout,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_API_SOURCE,
            Duration::from_millis(2000),
            Duration::from_millis(5000),
        )
    }
}

// ---------------------------------------------------------------------------
// Unified source enum
// ---------------------------------------------------------------------------

/// A remote simulation server, real or canned.
#[derive(Debug, Clone)]
pub enum RemoteSource {
    /// A live server reached over HTTP.
    Http(HttpRemote),
    /// Canned in-memory responses.
    Static(StaticRemote),
}

impl RemoteSource {
    /// Issue `GET <base><path>` and return the raw body of a 200 reply.
    ///
    /// An empty `credential` sends no `x-api-key` header.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unavailable`] when the server cannot be
    /// reached in time, and [`RemoteError::Rejected`] for any non-200 reply.
    pub async fn get(
        &self,
        path: &str,
        credential: &str,
        class: CallClass,
    ) -> Result<Vec<u8>, RemoteError> {
        match self {
            Self::Http(remote) => remote.get(path, credential, class).await,
            Self::Static(remote) => remote.get(path, credential, class),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::Static(_) => "static",
        }
    }
}

impl From<HttpRemote> for RemoteSource {
    fn from(remote: HttpRemote) -> Self {
        Self::Http(remote)
    }
}

impl From<StaticRemote> for RemoteSource {
    fn from(remote: StaticRemote) -> Self {
        Self::Static(remote)
    }
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

/// A live simulation server reached with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    /// Create a backend for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RemoteError::Unavailable(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client, config })
    }

    /// The server's base URL.
    pub fn api_source(&self) -> &str {
        &self.config.api_source
    }

    async fn get(
        &self,
        path: &str,
        credential: &str,
        class: CallClass,
    ) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}{path}", self.config.api_source);
        debug!(url, ?class, "remote fetch");

        let mut request = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .timeout(self.config.timeout_for(class));
        if !credential.is_empty() {
            request = request.header("x-api-key", credential);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Unavailable(format!("{url} timed out"))
            } else {
                RemoteError::Unavailable(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Unavailable(format!("{url}: reading body failed: {e}")))?;

        if status != StatusCode::OK {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}
