// system-tests/tests/suites/concurrent_repair_creation.rs
// ============================================================================
// Module: Concurrent Repair Creation Scenario
// Description: Two concurrent repair-session creates on the same plan race
//   under the plan's advisory lock; exactly one wins.
// Purpose: End-to-end coverage of the single-open-session invariant.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn only_one_concurrent_create_opens_a_session() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_id, site_id) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (_user_id, email, password) = harness::seed_user(&store, &tenant_id, vec![Role::OperatorAdmin], "approver@acme.test");

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = harness::login(&client, &server.base_url, &email, &password).await;

    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-w05", "seed": 2}))
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

    let request_body = serde_json::json!({
        "plan_id": plan_id,
        "requested_changes": {"pin_key": "tour-1", "driver_id": "driver-2"},
        "preview_payload": {"diff": "tour-1 -> driver-2"},
    });

    let fire = |idempotency_key: &'static str| {
        let client = client.clone();
        let base_url = server.base_url.clone();
        let cookie = cookie.clone();
        let body = request_body.clone();
        async move {
            client
                .post(format!("{base_url}/repairs/sessions"))
                .header(reqwest::header::COOKIE, cookie.as_str())
                .header("idempotency-key", idempotency_key)
                .json(&body)
                .send()
                .await
                .expect("repair create request sends")
        }
    };

    let (first, second) = tokio::join!(fire("race-a"), fire("race-b"));
    let statuses = [first.status(), second.status()];

    assert!(statuses.contains(&reqwest::StatusCode::OK), "expected one winner, got {statuses:?}");
    assert!(statuses.contains(&reqwest::StatusCode::CONFLICT), "expected one loser, got {statuses:?}");

    let conflict_body: serde_json::Value = if first.status() == reqwest::StatusCode::CONFLICT {
        first.json().await.expect("conflict response is json")
    } else {
        second.json().await.expect("conflict response is json")
    };
    assert_eq!(conflict_body["error_code"], "SESSION_ALREADY_EXISTS");
}
