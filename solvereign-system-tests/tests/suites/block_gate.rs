// system-tests/tests/suites/block_gate.rs
// ============================================================================
// Module: Block Gate Scenario
// Description: A plan with a BLOCK-severity violation cannot be published.
// Purpose: End-to-end coverage of the publish gate's BLOCK precondition.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn solved_plan_with_block_violations_refuses_publish() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_id, site_id) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (_user_id, email, password) = harness::seed_user(&store, &tenant_id, vec![Role::OperatorAdmin], "approver@acme.test");

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = harness::login(&client, &server.base_url, &email, &password).await;

    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-w04", "seed": 1}))
        .send()
        .await
        .expect("create request sends");
    assert_eq!(created.status(), reqwest::StatusCode::OK);
    let plan: serde_json::Value = created.json().await.expect("create response is json");
    let plan_id = plan["id"].as_str().expect("plan has an id").to_string();

    // Eight tours on a single driver pushes that driver's weekly hours to
    // 64 (see harness::single_driver_solve_inputs), well past the gate's
    // 48-hour BLOCK threshold.
    let solved = client
        .post(format!("{}/plans/{plan_id}/solve", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"inputs": harness::single_driver_solve_inputs(8)}))
        .send()
        .await
        .expect("solve request sends");
    assert_eq!(solved.status(), reqwest::StatusCode::OK);
    let solved_plan: serde_json::Value = solved.json().await.expect("solve response is json");
    assert_eq!(solved_plan["state"], "SOLVED");

    let violations: serde_json::Value = client
        .get(format!("{}/plans/{plan_id}/violations", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .send()
        .await
        .expect("violations request sends")
        .json()
        .await
        .expect("violations response is json");
    assert!(violations["block_count"].as_u64().unwrap_or(0) > 0, "expected at least one BLOCK violation, got {violations}");

    let publish = client
        .post(format!("{}/snapshots/publish", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"plan_id": plan_id, "reason": "attempted publish over blocking violations"}))
        .send()
        .await
        .expect("publish request sends");
    assert_eq!(publish.status(), reqwest::StatusCode::CONFLICT);
    let body: serde_json::Value = publish.json().await.expect("publish error response is json");
    assert_eq!(body["error_code"], "VIOLATIONS_BLOCK_PUBLISH");
}
