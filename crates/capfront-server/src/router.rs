//! Axum router construction for the display API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Every route is a `GET`, mirroring the links and buttons of the display.
/// CORS allows any origin so a separately served front end can call in.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Display pages
        .route("/", get(handlers::index))
        .route("/commodities", get(handlers::commodities))
        .route("/industries", get(handlers::industries))
        .route("/classes", get(handlers::classes))
        .route("/industry_stocks", get(handlers::industry_stocks))
        .route("/class_stocks", get(handlers::class_stocks))
        .route("/trace", get(handlers::trace))
        .route("/commodity/{id}", get(handlers::commodity))
        .route("/industry/{id}", get(handlers::industry))
        .route("/class/{id}", get(handlers::class))
        // Actions and navigation
        .route("/action/{action}", get(handlers::action))
        .route("/back", get(handlers::back))
        .route("/forward", get(handlers::forward))
        .route("/compare/{step}", get(handlers::compare))
        // Users
        .route("/login", get(handlers::login))
        .route("/user/select/{name}", get(handlers::select_user))
        .route("/user/quit", get(handlers::quit))
        .route("/user/dashboard", get(handlers::user_dashboard))
        .route("/user/create/{id}", get(handlers::create_simulation))
        .route("/user/delete/{id}", get(handlers::delete_simulation))
        // Administration
        .route("/admin/dashboard", get(handlers::admin_dashboard))
        .route("/admin/reset", get(handlers::admin_reset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
