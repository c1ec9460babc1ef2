// system-tests/tests/suites/lock_irreversibility.rs
// ============================================================================
// Module: Lock Irreversibility Scenario
// Description: Once a plan is LOCKED, every mutation against it is refused.
// Purpose: End-to-end coverage of the locked-plan boundary.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn locked_plan_refuses_pins_relock_and_repair_apply() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_id, site_id) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (_user_id, email, password) = harness::seed_user(&store, &tenant_id, vec![Role::TenantAdmin], "owner@acme.test");

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = harness::login(&client, &server.base_url, &email, &password).await;

    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-w07", "seed": 4}))
        .send()
        .await
        .expect("create request sends");
    let plan: serde_json::Value = created.json().await.expect("create response is json");
    let plan_id = plan["id"].as_str().expect("plan has an id").to_string();

    let solved = client
        .post(format!("{}/plans/{plan_id}/solve", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"inputs": harness::clean_solve_inputs()}))
        .send()
        .await
        .expect("solve request sends");
    assert_eq!(solved.status(), reqwest::StatusCode::OK);

    let published = client
        .post(format!("{}/snapshots/publish", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"plan_id": plan_id, "reason": "Weekly plan W07 approved"}))
        .send()
        .await
        .expect("publish request sends");
    assert_eq!(published.status(), reqwest::StatusCode::OK);

    let locked = client
        .post(format!("{}/plans/{plan_id}/lock", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"reason": "cutover to dispatch", "confirm": true}))
        .send()
        .await
        .expect("lock request sends");
    assert_eq!(locked.status(), reqwest::StatusCode::OK);
    let locked_plan: serde_json::Value = locked.json().await.expect("lock response is json");
    assert_eq!(locked_plan["state"], "LOCKED");

    let relock = client
        .post(format!("{}/plans/{plan_id}/lock", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"reason": "second lock attempt", "confirm": true}))
        .send()
        .await
        .expect("relock request sends");
    assert_eq!(relock.status(), reqwest::StatusCode::CONFLICT);
    let relock_body: serde_json::Value = relock.json().await.expect("relock error response is json");
    assert_eq!(relock_body["error_code"], "ALREADY_LOCKED");

    let pin_add = client
        .post(format!("{}/plans/{plan_id}/pins", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"pin_key": "tour-1", "payload": {"driver_id": "driver-1"}}))
        .send()
        .await
        .expect("pin add request sends");
    assert_eq!(pin_add.status(), reqwest::StatusCode::CONFLICT);
    let pin_body: serde_json::Value = pin_add.json().await.expect("pin error response is json");
    assert_eq!(pin_body["error_code"], "ALREADY_LOCKED");

    let repair_create = client
        .post(format!("{}/repairs/sessions", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({
            "plan_id": plan_id,
            "requested_changes": {"pin_key": "tour-1", "driver_id": "driver-2"},
            "preview_payload": {"diff": "tour-1 -> driver-2"},
        }))
        .send()
        .await
        .expect("repair create request sends");
    assert_eq!(repair_create.status(), reqwest::StatusCode::CONFLICT);
    let repair_body: serde_json::Value = repair_create.json().await.expect("repair error response is json");
    assert_eq!(repair_body["error_code"], "ALREADY_LOCKED");
}
