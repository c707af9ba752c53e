//! Integration tests for the display API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, with a `StaticRemote` scripted as the simulation
//! server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use capfront_core::{RemoteSource, SimulationClient, StaticRemote};
use capfront_server::handlers::USER_HEADER;
use capfront_server::router::build_router;
use capfront_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

const TABLES: [&str; 4] = ["classes", "stocks/industry", "stocks/class", "trace"];

fn script_step(canned: &StaticRemote, state: &str, size: i64) {
    canned.respond_json("simulations/current", &json!([{"id": 2, "state": state}]));
    canned.respond_json(
        "commodity",
        &json!([
            {"id": 1, "name": "Means of Production", "size": size},
            {"id": 2, "name": "Labour Power", "size": 50}
        ]),
    );
    canned.respond_json(
        "industry",
        &json!([{"id": 1, "name": "Department I", "output": "Means of Production"}]),
    );
    for path in TABLES {
        canned.respond_json(path, &json!([{"id": 1}]));
    }
}

async fn make_test_state() -> (StaticRemote, Arc<AppState>) {
    let canned = StaticRemote::new();
    canned.respond_raw("", b"{}".to_vec());
    canned.respond_json(
        "admin/users",
        &json!([
            {"username": "amy", "api_key": "a-key", "current_simulation_id": 2, "is_locked": true},
            {"username": "admin", "api_key": "admin-key", "current_simulation_id": 0, "is_locked": true}
        ]),
    );
    canned.respond_json(
        "admin/user/amy",
        &json!({"username": "amy", "current_simulation_id": 2, "is_locked": true}),
    );
    canned.respond_json(
        "admin/user/admin",
        &json!({"username": "admin", "current_simulation_id": 0, "is_locked": true}),
    );
    script_step(&canned, "TRADE", 100);

    let client = SimulationClient::new(RemoteSource::from(canned.clone()), "admin-key");
    client.load_directory().await.unwrap();
    let state = AppState::new(client, Some(String::from("amy")), String::from("admin"));
    (canned, Arc::new(state))
}

async fn get(state: &Arc<AppState>, uri: &str, user: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let app = build_router(Arc::clone(state));
    let mut request = Request::builder().uri(uri);
    if let Some(user) = user {
        request = request.header(USER_HEADER, user);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_owned());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, location, json)
}

#[tokio::test]
async fn commodities_page_reports_user_state_and_cursors() {
    let (_, state) = make_test_state().await;
    let (status, _, json) = get(&state, "/commodities", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "amy");
    assert_eq!(json["state"], "TRADE");
    assert_eq!(json["current_step"], 0);
    assert_eq!(json["body"]["records"].as_array().unwrap().len(), 2);
    assert_eq!(json["body"]["records"][0]["size"]["changed"], false);
}

#[tokio::test]
async fn action_redirects_to_last_page_and_diffs() {
    let (canned, state) = make_test_state().await;
    let _ = get(&state, "/commodities", Some("amy")).await;

    canned.respond_raw("action/trade", b"{}".to_vec());
    script_step(&canned, "PRODUCE", 80);
    let (status, location, json) = get(&state, "/action/trade", Some("amy")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/commodities"));
    assert_eq!(json["state"], "PRODUCE");
    assert_eq!(json["step"], 1);

    let (_, _, page) = get(&state, "/commodity/1", Some("amy")).await;
    assert_eq!(page["viewed_step"], 1);
    assert_eq!(page["comparator_step"], 0);
    assert_eq!(page["body"]["size"]["viewed"], "80");
    assert_eq!(page["body"]["size"]["compared"], "100");
    assert_eq!(page["body"]["size"]["changed"], true);

    let (status, _, cursors) = get(&state, "/back", Some("amy")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(cursors["viewed_step"], 0);
}

#[tokio::test]
async fn unknown_action_is_bad_request() {
    let (_, state) = make_test_state().await;
    let (status, _, json) = get(&state, "/action/rebel", Some("amy")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn unlocked_user_is_sent_to_login() {
    let (canned, state) = make_test_state().await;
    canned.respond_json(
        "admin/user/amy",
        &json!({"username": "amy", "current_simulation_id": 2, "is_locked": false}),
    );
    let (status, location, _) = get(&state, "/industries", Some("amy")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn dead_server_is_unavailable() {
    let (canned, state) = make_test_state().await;
    canned.set_unavailable("");
    let (status, _, json) = get(&state, "/", Some("amy")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn unknown_user_is_unavailable() {
    let (_, state) = make_test_state().await;
    let (status, _, _) = get(&state, "/classes", Some("mallory")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let (_, state) = make_test_state().await;
    let (status, _, json) = get(&state, "/industry/42", Some("amy")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "industry 42");
}

#[tokio::test]
async fn admin_pages_are_admin_only() {
    let (canned, state) = make_test_state().await;
    let (status, _, _) = get(&state, "/admin/dashboard", Some("amy")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, json) = get(&state, "/admin/dashboard", Some("admin")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = json["body"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["admin", "amy"]);

    canned.respond_raw("action/reset", b"{}".to_vec());
    let (status, location, _) = get(&state, "/admin/reset", Some("admin")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin/dashboard"));
    assert_eq!(canned.call_count("action/reset"), 1);
}

#[tokio::test]
async fn select_and_quit_round_trip() {
    let (canned, state) = make_test_state().await;
    canned.respond_raw("users/lock/amy", b"{}".to_vec());
    canned.respond_raw("users/unlock/amy", b"{}".to_vec());

    let (status, location, _) = get(&state, "/user/select/amy", None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/user/dashboard"));

    let (status, location, _) = get(&state, "/user/quit", Some("amy")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login"));
    assert_eq!(canned.call_count("users/unlock/amy"), 1);

    let _ = get(&state, "/user/select/amy", None).await;
    let locked = state.client.registry().lock("amy").await.map(|user| user.locked);
    assert_eq!(locked, Some(true));

    canned.set_unavailable("users/unlock/amy");
    let (status, location, _) = get(&state, "/user/quit", Some("amy")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login"));
    assert_eq!(canned.call_count("users/unlock/amy"), 2);
    let locked = state.client.registry().lock("amy").await.map(|user| user.locked);
    assert_eq!(locked, Some(false));

    canned.respond_status("users/lock/amy", 409, "taken");
    let (status, location, _) = get(&state, "/user/select/amy", None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn dashboard_lists_simulations_and_templates() {
    let (canned, state) = make_test_state().await;
    canned.respond_json("simulations/", &json!([{"id": 2, "name": "First"}]));
    let (status, _, json) = get(&state, "/user/dashboard", Some("amy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["body"]["simulations"][0]["name"], "First");
    assert_eq!(json["body"]["templates"], json!([]));
}

#[tokio::test]
async fn industry_view_resolves_stocks() {
    let (canned, state) = make_test_state().await;
    canned.respond_json(
        "stocks/industry",
        &json!([
            {"id": 1, "industry_id": 1, "commodity_id": 1, "usage_type": "Production", "value": 30},
            {"id": 2, "industry_id": 1, "commodity_id": 2, "usage_type": "Production", "value": 20},
            {"id": 3, "industry_id": 1, "commodity_id": 0, "usage_type": "Money", "size": 500}
        ]),
    );
    let (status, _, json) = get(&state, "/industry/1", Some("amy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["body"]["constant_capital"]["value"]["viewed"], "30");
    assert_eq!(json["body"]["variable_capital"]["value"]["viewed"], "20");
    assert_eq!(json["body"]["money"]["size"]["viewed"], "500");
    assert_eq!(json["body"]["sales"]["size"]["viewed"], Value::Null);
}
