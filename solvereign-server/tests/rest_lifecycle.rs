// solvereign-server/tests/rest_lifecycle.rs
// ============================================================================
// Module: REST Lifecycle Integration Test
// Description: Drives the HTTP surface end to end over a real listener:
//   login, create a draft plan, solve it, publish, lock, and a permission
//   denial on an under-privileged role.
// Dependencies: solvereign-core, solvereign-config, solvereign-rbac,
//   solvereign-solver, solvereign-store-sqlite, axum, tokio, reqwest
// ============================================================================

use std::sync::Arc;

use solvereign_config::SolvereignConfig;
use solvereign_core::KillSwitchStore;
use solvereign_core::Role;
use solvereign_core::Site;
use solvereign_core::SiteId;
use solvereign_core::SiteStore;
use solvereign_core::Tenant;
use solvereign_core::TenantId;
use solvereign_core::TenantStore;
use solvereign_core::Timestamp;
use solvereign_core::User;
use solvereign_core::UserId;
use solvereign_core::UserStore;
use solvereign_server::AppState;
use solvereign_server::NoopAuditSink;
use solvereign_solver::DeterministicSolver;
use solvereign_store_sqlite::SqliteStore;

/// A running server bound to an ephemeral loopback port, plus the base URL
/// to reach it at. Dropping this leaves the background task running for the
/// remainder of the test process, mirroring the "own tokio runtime, never
/// torn down" lifetime of the binary this crate builds for production.
struct TestServer {
    base_url: String,
}

async fn spawn_server(store: Arc<SqliteStore>) -> TestServer {
    let state = AppState::new(
        store,
        Arc::new(DeterministicSolver::new()),
        Arc::new(SolvereignConfig::default()),
        Arc::new(NoopAuditSink),
        Arc::new(solvereign_rbac::NoopAuditSink),
    );
    let router = solvereign_server::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("listener binds");
    let addr = listener.local_addr().expect("listener has a local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server runs");
    });
    TestServer { base_url: format!("http://{addr}") }
}

/// Seeds a tenant, a publish-enabled site, and a user holding `roles`.
/// Returns `(store, tenant_id, site_id, email, password)`.
fn seeded_store(roles: Vec<Role>) -> (Arc<SqliteStore>, TenantId, SiteId, String, String) {
    let store = SqliteStore::open_in_memory().expect("in-memory store opens");
    let tenant_id = TenantId::new("acme");
    TenantStore::create(
        &store,
        &Tenant { id: tenant_id.clone(), code: "ACME".to_string(), name: "Acme Logistics".to_string(), created_at: Timestamp::from_unix_seconds(0) },
    )
    .expect("tenant creates");

    let site_id = SiteId::new("acme-depot-1");
    SiteStore::create(&store, &Site { id: site_id.clone(), tenant_id: tenant_id.clone(), site_code: "DEPOT1".to_string(), name: "Depot 1".to_string(), publish_enabled: true })
        .expect("site creates");
    KillSwitchStore::set_enabled(&store, &tenant_id, &site_id, "publish", true).expect("kill switch toggles");

    let email = "dispatcher@acme.test".to_string();
    let password = "hunter2-hunter2".to_string();
    let user = User {
        id: UserId::new("u-1"),
        email: email.clone(),
        password_hash: solvereign_rbac::hash_password(&password).expect("password hashes"),
        tenant_id: Some(tenant_id.clone()),
        is_platform: false,
        roles,
        created_at: Timestamp::from_unix_seconds(0),
    };
    UserStore::create(&store, &user).expect("user creates");

    (Arc::new(store), tenant_id, site_id, email, password)
}

/// Logs in and returns the `Set-Cookie` header's raw value, ready to be
/// replayed on subsequent requests via the `Cookie` header.
async fn login(client: &reqwest::Client, base_url: &str, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{base_url}/auth/login"))
        .json(&serde_json::json!({"email": email, "password": password}))
        .send()
        .await
        .expect("login request sends");
    assert_eq!(response.status(), reqwest::StatusCode::OK, "login should succeed");
    let set_cookie = response.headers().get(reqwest::header::SET_COOKIE).expect("login sets a cookie").to_str().expect("cookie header is ascii").to_string();
    set_cookie.split(';').next().expect("cookie header has a value").to_string()
}

fn solve_inputs() -> serde_json::Value {
    serde_json::json!({
        "tours": ["tour-1", "tour-2"],
        "drivers": ["driver-1", "driver-2"],
        "vehicles": ["vehicle-1", "vehicle-2"],
    })
}

#[tokio::test]
async fn full_plan_lifecycle_reaches_locked() {
    let (store, _tenant_id, site_id, email, password) = seeded_store(vec![Role::TenantAdmin]);
    let server = spawn_server(Arc::clone(&store)).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = login(&client, &server.base_url, &email, &password).await;

    let created = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-1", "seed": 7}))
        .send()
        .await
        .expect("create request sends");
    assert_eq!(created.status(), reqwest::StatusCode::OK);
    let plan: serde_json::Value = created.json().await.expect("create response is json");
    let plan_id = plan["id"].as_str().expect("plan has an id").to_string();

    let solved = client
        .post(format!("{}/plans/{plan_id}/solve", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"inputs": solve_inputs()}))
        .send()
        .await
        .expect("solve request sends");
    assert_eq!(solved.status(), reqwest::StatusCode::OK);
    let solved_plan: serde_json::Value = solved.json().await.expect("solve response is json");
    assert_eq!(solved_plan["state"], "SOLVED");

    let published = client
        .post(format!("{}/snapshots/publish", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"plan_id": plan_id, "reason": "weekly schedule ready for dispatch"}))
        .send()
        .await
        .expect("publish request sends");
    assert_eq!(published.status(), reqwest::StatusCode::OK, "publish body: {:?}", published.text().await);

    let locked = client
        .post(format!("{}/plans/{plan_id}/lock", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"reason": "end of week, no further changes expected", "confirm": true}))
        .send()
        .await
        .expect("lock request sends");
    assert_eq!(locked.status(), reqwest::StatusCode::OK, "lock body: {:?}", locked.text().await);
    let locked_plan: serde_json::Value = locked.json().await.expect("lock response is json");
    assert_eq!(locked_plan["state"], "LOCKED");
}

#[tokio::test]
async fn readonly_role_cannot_create_a_plan() {
    let (store, _tenant_id, site_id, email, password) = seeded_store(vec![Role::OpsReadonly]);
    let server = spawn_server(store).await;
    let client = reqwest::Client::builder().build().expect("client builds");
    let cookie = login(&client, &server.base_url, &email, &password).await;

    let response = client
        .post(format!("{}/plans", server.base_url))
        .header(reqwest::header::COOKIE, cookie.as_str())
        .json(&serde_json::json!({"site_id": site_id.as_str(), "forecast_version_id": "fv-1", "seed": 7}))
        .send()
        .await
        .expect("create request sends");
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unauthenticated_request_is_rejected() {
    let (store, _tenant_id, _site_id, _email, _password) = seeded_store(vec![Role::Dispatcher]);
    let server = spawn_server(store).await;
    let client = reqwest::Client::builder().build().expect("client builds");

    let response = client.get(format!("{}/plans", server.base_url)).send().await.expect("request sends");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn liveness_probe_does_not_require_a_session() {
    let (store, ..) = seeded_store(vec![Role::Dispatcher]);
    let server = spawn_server(store).await;
    let client = reqwest::Client::builder().build().expect("client builds");

    let response = client.get(format!("{}/health", server.base_url)).send().await.expect("request sends");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
