// system-tests/tests/suites/expired_apply.rs
// ============================================================================
// Module: Expired Apply Scenario
// Description: Applying a repair session past its TTL returns SESSION_EXPIRED.
// Purpose: End-to-end coverage of repair-session lapse handling.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::PlanId;
use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn applying_a_lapsed_session_returns_410() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_id, site_id) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (user_id, email, password) = harness::seed_user(&store, &tenant_id, vec![Role::OperatorAdmin], "approver@acme.test");

    let created_plan_id;
    {
        let server = harness::spawn_server(Arc::clone(&store)).await;
        let client = reqwest::Client::builder().build().expect("client builds");
        let cookie = harness::login(&client, &server.base_url, &email, &password).await;

        let created = client
            .post(format!("{}/plans", server.base_url))
            .header(reqwest::header::COOKIE, cookie.as_str())
            .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-w06", "seed": 3}))
            .send()
            .await
            .expect("create request sends");
        let plan: serde_json::Value = created.json().await.expect("create response is json");
        created_plan_id = plan["id"].as_str().expect("plan has an id").to_string();

        let solved = client
            .post(format!("{}/plans/{created_plan_id}/solve", server.base_url))
            .header(reqwest::header::COOKIE, cookie.as_str())
            .json(&serde_json::json!({"inputs": harness::clean_solve_inputs()}))
            .send()
            .await
            .expect("solve request sends");
        assert_eq!(solved.status(), reqwest::StatusCode::OK);
    }

    let plan_id = PlanId::new(created_plan_id);
    let session_id = harness::seed_expired_repair_session(&store, &tenant_id, &plan_id, &user_id);

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = harness::login(&client, &server.base_url, &email, &password).await;

    let apply = client
        .post(format!("{}/repairs/sessions/{}/apply", server.base_url, session_id.as_str()))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .send()
        .await
        .expect("apply request sends");

    assert_eq!(apply.status(), reqwest::StatusCode::GONE);
    let body: serde_json::Value = apply.json().await.expect("apply error response is json");
    assert_eq!(body["error_code"], "SESSION_EXPIRED");
}
