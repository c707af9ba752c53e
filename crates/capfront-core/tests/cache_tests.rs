//! End-to-end tests of the snapshot cache against a scripted server.
//!
//! Each test drives a [`SimulationClient`] through reconciliation and
//! actions with a [`StaticRemote`] standing in for the simulation server.

#![allow(clippy::unwrap_used)]

use capfront_core::view::commodity_views;
use capfront_core::{Reconciliation, RemoteSource, SimulationClient, StaticRemote, User};
use capfront_types::{Action, ActionState, CommodityId, SimulationId};
use rust_decimal_macros::dec;
use serde_json::json;

const TABLES: [&str; 5] = ["industry", "classes", "stocks/industry", "stocks/class", "trace"];

fn script_step(canned: &StaticRemote, state: &str, commodity_size: i64) {
    canned.respond_json("simulations/current", &json!([{"id": 2, "state": state}]));
    canned.respond_json("commodity", &json!([{"id": 1, "name": "Wheat", "size": commodity_size}]));
    for path in TABLES {
        canned.respond_json(path, &json!([{"id": 1}]));
    }
}

async fn setup() -> (StaticRemote, SimulationClient) {
    let canned = StaticRemote::new();
    canned.respond_raw("", b"{}".to_vec());
    canned.respond_json(
        "admin/users",
        &json!([{"username": "amy", "api_key": "a-key", "current_simulation_id": 2, "is_locked": true}]),
    );
    canned.respond_json(
        "admin/user/amy",
        &json!({"username": "amy", "current_simulation_id": 2, "is_locked": true}),
    );
    let client = SimulationClient::new(RemoteSource::from(canned.clone()), "admin-key");
    client.load_directory().await.unwrap();
    (canned, client)
}

#[tokio::test]
async fn trade_scenario() {
    let (canned, client) = setup().await;
    script_step(&canned, "TRADE", 100);

    // First request after startup populates step 0.
    let Reconciliation::Proceed(mut user) = client.reconcile(Some("amy"), Some("/commodities")).await
    else {
        panic!("expected to proceed");
    };
    assert_eq!(user.timeline.current_step(), 0);
    assert_eq!(user.state(), ActionState::Trade);
    assert_eq!(user.timeline.current().commodities().len(), 1);

    // The server trades: commodity sizes change and the stage moves on.
    canned.respond_raw("action/trade", b"{}".to_vec());
    script_step(&canned, "PRODUCE", 80);
    let report = client.perform_action(&mut user, Action::Trade).await;

    assert!(report.is_clean());
    assert_eq!(report.redirect, "/commodities");
    assert_eq!(user.timeline.current_step(), 1);
    assert_eq!(user.timeline.viewed_step(), 1);
    assert_eq!(user.state(), ActionState::Produce);

    let views = commodity_views(user.timeline.get(1), user.timeline.get(0));
    let wheat = views.find(|v| v.id == CommodityId::new(1)).unwrap();
    assert!(wheat.present_at_comparator);
    assert_eq!(wheat.view.size.viewed, dec!(80));
    assert_eq!(wheat.view.size.compared, dec!(100));
    assert!(wheat.view.size.is_changed());

    user.timeline.step_back();
    assert_eq!(user.timeline.viewed_step(), 0);
    assert_eq!(user.timeline.viewed().commodities().first().map(|c| c.size), Some(dec!(100)));
}

#[tokio::test]
async fn reconciliation_converges_on_server_simulation() {
    let (canned, client) = setup().await;
    script_step(&canned, "DEMAND", 10);

    {
        let Some(handle) = client.registry().get("amy").await else {
            panic!("amy should be in the directory");
        };
        let mut user = handle.lock().await;
        user.remote_simulation_id = SimulationId::new(99);
    }

    let outcome = client.reconcile(Some("amy"), None).await;
    let Reconciliation::Proceed(user) = outcome else {
        panic!("expected to proceed");
    };
    assert_eq!(user.remote_simulation_id, SimulationId::new(2));
    assert!(user.timeline.current().is_populated());
    assert_eq!(user.timeline.current().commodities().len(), 1);
    assert_eq!(user.timeline.viewed_step(), user.timeline.current_step());
}

#[tokio::test]
async fn full_circuit_returns_to_start() {
    let (canned, client) = setup().await;
    canned.respond_json("simulations/current", &json!([]));
    for action in Action::ALL {
        canned.respond_raw(&format!("action/{action}"), b"{}".to_vec());
    }
    canned.respond_json("commodity", &json!([{"id": 1}]));

    let mut user = User::new("bob", "b-key");
    user.cached_state = ActionState::Demand;
    for action in Action::ALL {
        assert_eq!(user.state().action(), action);
        client.perform_action(&mut user, action).await;
    }
    assert_eq!(user.state(), ActionState::Demand);
    assert_eq!(user.timeline.len(), 7);
}

#[tokio::test]
async fn requests_for_one_user_take_turns() {
    let (canned, client) = setup().await;
    script_step(&canned, "DEMAND", 10);

    let first = client.reconcile(Some("amy"), None).await;
    assert!(matches!(first, Reconciliation::Proceed(_)));

    // While the first guard is held the user is busy.
    let handle = client.registry().get("amy").await.unwrap();
    assert!(handle.try_lock().is_err());
    drop(first);
    assert!(handle.try_lock().is_ok());
}
