//! Error types for the display API.
//!
//! [`ApiError`] unifies every way a request can fail and converts into an
//! Axum response. Being sent back to the login page is one of those ways:
//! it becomes a `303 See Other` to `/login` instead of a JSON error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::warn;

use capfront_core::{CoreError, DivertReason, RemoteError};

/// Where diverted requests are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// Errors that can occur in the display API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The user must log in (again).
    #[error("login required: {0}")]
    Divert(DivertReason),

    /// The simulation server is unreachable or the local directory is inconsistent.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The requested entity does not exist at the viewed step.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The user may not do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LockDenied(_) => Self::Divert(DivertReason::LockDenied),
            CoreError::InvalidAction(e) => Self::BadRequest(e.to_string()),
            CoreError::UnknownUser(_) | CoreError::Remote(RemoteError::Unavailable(_)) => {
                Self::Unavailable(err.to_string())
            }
            CoreError::Remote(RemoteError::Rejected { .. })
            | CoreError::Decode { .. }
            | CoreError::Snapshot(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Divert(reason) => {
                warn!(%reason, "diverting to login");
                return Redirect::to(LOGIN_ROUTE).into_response();
            }
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
