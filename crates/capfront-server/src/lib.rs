//! Display and action API for the Capfront simulation client.
//!
//! This crate puts an Axum HTTP server in front of
//! [`capfront_core::SimulationClient`]. Display routes return JSON pages
//! (username, stage, timeline cursors and a body of paired views); action
//! and navigation routes answer `303 See Other` pointing at the page to
//! show next. Requests that need a login are redirected to `/login`.
//!
//! # Architecture
//!
//! The server holds no simulation state of its own. Each request names a
//! user; the handler reconciles that user with the simulation server and
//! then works on the user's cached timeline under the user's lock.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::ServerConfig;
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, build_state, start_server};
pub use state::AppState;
