// system-tests/tests/suites/cross_tenant_denial.rs
// ============================================================================
// Module: Cross-Tenant Denial Scenario
// Description: A user cannot see a plan belonging to another tenant.
// Purpose: End-to-end coverage of tenant isolation on plan lookup.
// Dependencies: helpers
// ============================================================================

use std::sync::Arc;

use solvereign_core::Role;
use solvereign_store_sqlite::SqliteStore;

use crate::helpers::harness;

#[tokio::test]
async fn foreign_tenant_plan_lookup_returns_404_not_403() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store opens"));
    let (tenant_a, site_a) = harness::seed_tenant_and_site(&store, "ACME", "DEPOT1");
    let (_, email_a, password_a) = harness::seed_user(&store, &tenant_a, vec![Role::OperatorAdmin], "approver@acme.test");

    let (tenant_b, _site_b) = harness::seed_tenant_and_site(&store, "GLOBEX", "DEPOT1");
    let (_, email_b, password_b) = harness::seed_user(&store, &tenant_b, vec![Role::OperatorAdmin], "viewer@globex.test");

    let server = harness::spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");

    let cookie_a = harness::login(&client, &server.base_url, &email_a, &password_a).await;
    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie_a.as_str())
        .json(&serde_json::json!({"site_id": site_a.as_str(), "forecast_version_id": "fv-w08", "seed": 5}))
        .send()
        .await
        .expect("create request sends");
    assert_eq!(created.status(), reqwest::StatusCode::OK);
    let plan: serde_json::Value = created.json().await.expect("create response is json");
    let plan_id = plan["id"].as_str().expect("plan has an id").to_string();

    let cookie_b = harness::login(&client, &server.base_url, &email_b, &password_b).await;
    let foreign_lookup = client
        .get(format!("{}/plans/{plan_id}", server.base_url))
        .header(reqwest::header::COOKIE, cookie_b.as_str())
        .send()
        .await
        .expect("foreign lookup request sends");

    assert_eq!(foreign_lookup.status(), reqwest::StatusCode::NOT_FOUND, "a plan in another tenant must read as not found, never forbidden");
    let body: serde_json::Value = foreign_lookup.json().await.expect("foreign lookup error response is json");
    assert_eq!(body["error_code"], "NOT_FOUND");

    let own_lookup = client
        .get(format!("{}/plans/{plan_id}", server.base_url))
        .header(reqwest::header::COOKIE, cookie_a.as_str())
        .send()
        .await
        .expect("own lookup request sends");
    assert_eq!(own_lookup.status(), reqwest::StatusCode::OK);
}
