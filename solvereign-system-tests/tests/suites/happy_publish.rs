// system-tests/tests/suites/happy_publish.rs
// ============================================================================
// Module: Happy Publish Scenario
// Description: Draft -> solve -> publish -> idempotent replay.
// Purpose: End-to-end coverage of the uncontested publish path.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn happy_publish_creates_snapshot_and_replays_idempotently() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_id, site_id) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (_user_id, email, password) = harness::seed_user(&store, &tenant_id, vec![Role::OperatorAdmin], "approver@acme.test");

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = harness::login(&client, &server.base_url, &email, &password).await;

    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-w03", "seed": 42}))
        .send()
        .await
        .expect("create request sends");
    assert_eq!(created.status(), reqwest::StatusCode::OK);
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
    let solved_plan: serde_json::Value = solved.json().await.expect("solve response is json");
    assert_eq!(solved_plan["state"], "SOLVED");

    let publish_request = serde_json::json!({"plan_id": plan_id, "reason": "Weekly plan W03 approved"});
    let first = client
        .post(format!("{}/snapshots/publish", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .header("idempotency-key", "K1")
        .json(&publish_request)
        .send()
        .await
        .expect("publish request sends");
    assert_eq!(first.status(), reqwest::StatusCode::OK);
    let first_body: serde_json::Value = first.json().await.expect("publish response is json");
    assert_eq!(first_body["snapshot"]["version_number"], 1);
    let evidence_hash = first_body["snapshot"]["evidence_hash"].clone();
    assert!(!evidence_hash.is_null(), "a published snapshot must carry an evidence hash");

    let replay: serde_json::Value = client
        .post(format!("{}/snapshots/publish", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .header("idempotency-key", "K1")
        .json(&publish_request)
        .send()
        .await
        .expect("replay request sends")
        .json()
        .await
        .expect("replay response is json");

    assert_eq!(replay["snapshot"]["id"], first_body["snapshot"]["id"], "idempotent replay must return the same snapshot, not a new one");
    assert_eq!(replay["snapshot"]["version_number"], 1);
}
