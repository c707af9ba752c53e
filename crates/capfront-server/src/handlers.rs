//! Display and action endpoint handlers.
//!
//! Every handler that reads simulation data first reconciles the acting
//! user with the simulation server, then holds that user's lock for the
//! rest of the request. Acting identity comes from the `x-capfront-user`
//! header, falling back to the configured default user.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Commodities, industries and classes |
//! | `GET` | `/commodities` | Commodity views |
//! | `GET` | `/industries` | Industry views |
//! | `GET` | `/classes` | Class views |
//! | `GET` | `/industry_stocks` | Industry stock views |
//! | `GET` | `/class_stocks` | Class stock views |
//! | `GET` | `/trace` | Simulation log |
//! | `GET` | `/commodity/{id}` | One commodity |
//! | `GET` | `/industry/{id}` | One industry |
//! | `GET` | `/class/{id}` | One class |
//! | `GET` | `/action/{action}` | Perform a circuit action |
//! | `GET` | `/back`, `/forward` | Move the viewed step |
//! | `GET` | `/compare/{step}` | Set the comparator step |
//! | `GET` | `/login` | Users available to log in as |
//! | `GET` | `/user/select/{name}` | Log in |
//! | `GET` | `/user/quit` | Log out |
//! | `GET` | `/user/dashboard` | The user's simulations and templates |
//! | `GET` | `/user/create/{id}` | Clone a template |
//! | `GET` | `/user/delete/{id}` | Delete a simulation |
//! | `GET` | `/admin/dashboard` | Every user (administrator only) |
//! | `GET` | `/admin/reset` | Reset the server (administrator only) |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use capfront_core::display::{
    class_page, class_stocks_page, classes_page, commodities_page, commodity_page,
    industries_page, industry_page, industry_stocks_page, index_page, trace_page,
};
use capfront_core::{
    CoreError, DisplayPage, DivertReason, Reconciliation, User, UserSummary, redirect_target,
};
use capfront_types::{Action, ClassId, CommodityId, IndustryId, SimulationId, TemplateId};

use crate::error::{ApiError, LOGIN_ROUTE};
use crate::state::AppState;

/// Request header naming the acting user.
pub const USER_HEADER: &str = "x-capfront-user";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The acting user's name, if any.
fn identity<'a>(state: &'a AppState, headers: &'a HeaderMap) -> Option<&'a str> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or(state.default_user.as_deref())
}

/// Reconcile the acting user and take their lock.
async fn session(
    state: &AppState,
    headers: &HeaderMap,
    route: Option<&str>,
) -> Result<OwnedMutexGuard<User>, ApiError> {
    match state.client.reconcile(identity(state, headers), route).await {
        Reconciliation::Proceed(user) => Ok(user),
        Reconciliation::DivertToLogin(reason) => Err(ApiError::Divert(reason)),
        Reconciliation::Fatal(e) => Err(ApiError::Unavailable(e.to_string())),
    }
}

/// A `303 See Other` to `location` that also carries a JSON body.
fn see_other<T: Serialize>(location: &str, body: T) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_owned())],
        Json(body),
    )
        .into_response()
}

/// Reject anyone but the administrator.
fn require_admin(state: &AppState, user: &User) -> Result<(), ApiError> {
    if user.name == state.admin_user {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "only the administrator can do this, not {}",
            user.name
        )))
    }
}

// ---------------------------------------------------------------------------
// Display pages
// ---------------------------------------------------------------------------

/// The landing page.
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/")).await?;
    Ok(Json(index_page(&user)))
}

/// Every commodity, viewed against the comparator step.
pub async fn commodities(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/commodities")).await?;
    Ok(Json(commodities_page(&user)))
}

/// Every industry, viewed against the comparator step.
pub async fn industries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/industries")).await?;
    Ok(Json(industries_page(&user)))
}

/// Every class, viewed against the comparator step.
pub async fn classes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/classes")).await?;
    Ok(Json(classes_page(&user)))
}

/// Every industry stock, viewed against the comparator step.
pub async fn industry_stocks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/industry_stocks")).await?;
    Ok(Json(industry_stocks_page(&user)))
}

/// Every class stock, viewed against the comparator step.
pub async fn class_stocks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/class_stocks")).await?;
    Ok(Json(class_stocks_page(&user)))
}

/// The simulation log at the viewed step.
pub async fn trace(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some("/trace")).await?;
    Ok(Json(trace_page(&user)))
}

/// One commodity.
pub async fn commodity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some(&format!("/commodity/{id}"))).await?;
    commodity_page(&user, CommodityId::new(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("commodity {id}")))
}

/// One industry.
pub async fn industry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some(&format!("/industry/{id}"))).await?;
    industry_page(&user, IndustryId::new(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("industry {id}")))
}

/// One social class.
pub async fn class(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, Some(&format!("/class/{id}"))).await?;
    class_page(&user, ClassId::new(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("class {id}")))
}

// ---------------------------------------------------------------------------
// Actions and navigation
// ---------------------------------------------------------------------------

/// Perform a circuit action and send the user back to what they were viewing.
pub async fn action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let action: Action = name.parse().map_err(CoreError::from)?;
    let mut user = session(&state, &headers, None).await?;
    let report = state.client.perform_action(&mut user, action).await;
    Ok(see_other(report.redirect, report))
}

/// View the previous step.
pub async fn back(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut user = session(&state, &headers, None).await?;
    user.timeline.step_back();
    let location = redirect_target(user.last_visited_route.as_deref());
    Ok(see_other(location, user.timeline.cursors()))
}

/// View the next step.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut user = session(&state, &headers, None).await?;
    user.timeline.step_forward();
    let location = redirect_target(user.last_visited_route.as_deref());
    Ok(see_other(location, user.timeline.cursors()))
}

/// Compare the viewed step against `step`.
pub async fn compare(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(step): Path<usize>,
) -> Result<Response, ApiError> {
    let mut user = session(&state, &headers, None).await?;
    user.timeline.compare_with(step);
    let location = redirect_target(user.last_visited_route.as_deref());
    Ok(see_other(location, user.timeline.cursors()))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Users a client may log in as.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    /// Every user not busy with another request.
    pub users: Vec<UserSummary>,
}

/// The login page: who can be selected.
pub async fn login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(LoginPage {
        users: state.client.admin_dashboard().await,
    })
}

/// Lock user `name` on the server for this client.
pub async fn select_user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    state.client.select_user(&name).await?;
    Ok(see_other(
        "/user/dashboard",
        serde_json::json!({ "username": name }),
    ))
}

/// Release the acting user.
pub async fn quit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let name = identity(&state, &headers)
        .ok_or(ApiError::Divert(DivertReason::NoIdentity))?
        .to_owned();
    let mut user = state
        .client
        .registry()
        .lock(&name)
        .await
        .ok_or_else(|| ApiError::from(CoreError::UnknownUser(name.clone())))?;

    // The local flag is cleared whatever the server says.
    if let Err(e) = state.client.quit(&mut user).await {
        debug!(username = %name, error = %e, "quitting without server unlock");
    }
    Ok(see_other(LOGIN_ROUTE, serde_json::json!({ "username": name })))
}

/// The user's simulations and the templates to clone from.
pub async fn user_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let mut user = session(&state, &headers, Some("/user/dashboard")).await?;
    let dashboard = state.client.dashboard(&mut user).await;
    Ok(Json(DisplayPage::for_user(&user, dashboard)))
}

/// Clone template `id` into a new simulation.
pub async fn create_simulation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let mut user = session(&state, &headers, None).await?;
    let simulation_id = state
        .client
        .create_simulation(&mut user, TemplateId::new(id))
        .await?;
    Ok(see_other(
        "/",
        serde_json::json!({ "simulation_id": simulation_id }),
    ))
}

/// Delete simulation `id` and show the refreshed dashboard.
pub async fn delete_simulation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let mut user = session(&state, &headers, None).await?;
    state
        .client
        .delete_simulation(&mut user, SimulationId::new(id))
        .await?;
    let dashboard = state.client.dashboard(&mut user).await;
    Ok(Json(DisplayPage::for_user(&user, dashboard)))
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

/// Every user the directory knows.
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = session(&state, &headers, None).await?;
    require_admin(&state, &user)?;

    // Release our own lock first so the administrator is listed too.
    let mut page = DisplayPage::for_user(&user, Vec::new());
    drop(user);
    page.body = state.client.admin_dashboard().await;
    Ok(Json(page))
}

/// Reset the server's database and show the admin dashboard.
pub async fn admin_reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    {
        let user = session(&state, &headers, None).await?;
        require_admin(&state, &user)?;
        info!(username = %user.name, "administrator requested a reset");
        state.client.admin_reset().await?;
    }
    Ok(Redirect::to("/admin/dashboard").into_response())
}
