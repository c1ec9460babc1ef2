// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Server Harness
// Description: Helpers for spawning a Solvereign server and seeding its
//   store in system-test scenarios.
// Purpose: Provide deterministic server startup and tenant/user/plan
//   fixtures shared by the end-to-end scenario suites.
// Dependencies: solvereign-core, solvereign-config, solvereign-rbac,
//   solvereign-server, solvereign-solver, solvereign-store-sqlite, axum,
//   tokio, reqwest
// ============================================================================

//! ## Overview
//! Each scenario suite spins up a real `axum::serve` listener on an
//! ephemeral loopback port against an in-memory `SQLite` store, then drives
//! it over HTTP with `reqwest`. This mirrors the single-process,
//! real-listener harness `solvereign-server`'s own integration test uses,
//! scaled up here to cover the multi-tenant and repair-session fixtures the
//! end-to-end scenarios need.

use std::sync::Arc;

use solvereign_config::SolvereignConfig;
use solvereign_core::HashAlgorithm;
use solvereign_core::HashDigest;
use solvereign_core::KillSwitchStore;
use solvereign_core::RepairSession;
use solvereign_core::RepairSessionId;
use solvereign_core::RepairSessionStore;
use solvereign_core::RepairStatus;
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

/// A running server bound to an ephemeral loopback port.
pub struct TestServer {
    pub base_url: String,
}

/// Spawns a router over `store` on an ephemeral loopback port and leaves it
/// running for the rest of the test process.
pub async fn spawn_server(store: Arc<SqliteStore>) -> TestServer {
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

/// Seeds a tenant and a publish-enabled site, returning their ids.
pub fn seed_tenant_and_site(store: &SqliteStore, tenant_code: &str, site_code: &str) -> (TenantId, SiteId) {
    let tenant_id = TenantId::new(format!("tenant-{tenant_code}"));
    TenantStore::create(
        store,
        &Tenant {
            id: tenant_id.clone(),
            code: tenant_code.to_string(),
            name: format!("{tenant_code} Logistics"),
            created_at: Timestamp::from_unix_seconds(0),
        },
    )
    .expect("tenant creates");

    let site_id = SiteId::new(format!("site-{site_code}"));
    SiteStore::create(
        store,
        &Site { id: site_id.clone(), tenant_id: tenant_id.clone(), site_code: site_code.to_string(), name: format!("{site_code} Depot"), publish_enabled: true },
    )
    .expect("site creates");
    KillSwitchStore::set_enabled(store, &tenant_id, &site_id, "publish", true).expect("kill switch toggles");

    (tenant_id, site_id)
}

/// Seeds a user bound to `tenant_id` holding `roles`. Returns `(user_id, email, password)`.
pub fn seed_user(store: &SqliteStore, tenant_id: &TenantId, roles: Vec<Role>, email: &str) -> (UserId, String, String) {
    let password = "correct-horse-battery".to_string();
    let user_id = UserId::new(format!("user-{email}"));
    let user = User {
        id: user_id.clone(),
        email: email.to_string(),
        password_hash: solvereign_rbac::hash_password(&password).expect("password hashes"),
        tenant_id: Some(tenant_id.clone()),
        is_platform: false,
        roles,
        created_at: Timestamp::from_unix_seconds(0),
    };
    UserStore::create(store, &user).expect("user creates");
    (user_id, email.to_string(), password)
}

/// Logs in and returns the `Set-Cookie` header's value, ready to be replayed
/// on subsequent requests via the `Cookie` header.
pub async fn login(client: &reqwest::Client, base_url: &str, email: &str, password: &str) -> String {
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

/// Solve inputs assigning `tour_count` tours across one driver and one
/// vehicle, so every extra tour past the sixth pushes that driver's weekly
/// hours over the gate's 48-hour limit (see `solvereign-core`'s gate rules).
pub fn single_driver_solve_inputs(tour_count: usize) -> serde_json::Value {
    let tours: Vec<String> = (0..tour_count).map(|index| format!("tour-{index}")).collect();
    serde_json::json!({
        "tours": tours,
        "drivers": ["driver-1"],
        "vehicles": ["vehicle-1"],
    })
}

/// Solve inputs for a plan with no constraint violations: two tours spread
/// across two drivers and two vehicles.
pub fn clean_solve_inputs() -> serde_json::Value {
    serde_json::json!({
        "tours": ["tour-1", "tour-2"],
        "drivers": ["driver-1", "driver-2"],
        "vehicles": ["vehicle-1", "vehicle-2"],
    })
}

/// Directly inserts an `OPEN` repair session with an already-lapsed
/// `expires_at`, bypassing `RepairSessionEngine::create` (which always
/// stamps a fresh TTL) so a test can exercise the apply-after-expiry path
/// without waiting out a real 30-minute window.
pub fn seed_expired_repair_session(store: &SqliteStore, tenant_id: &TenantId, plan_id: &solvereign_core::PlanId, created_by: &UserId) -> RepairSessionId {
    let id = RepairSessionId::new("expired-session");
    let session = RepairSession {
        id: id.clone(),
        tenant_id: tenant_id.clone(),
        plan_version_id: plan_id.clone(),
        created_by: created_by.clone(),
        created_at: Timestamp::from_unix_seconds(0),
        expires_at: Timestamp::from_unix_seconds(1),
        status: RepairStatus::Open,
        requested_changes: serde_json::json!({}),
        preview_payload: serde_json::json!({}),
        baseline_assignments_hash: HashDigest { algorithm: HashAlgorithm::Sha256, value: "0".repeat(64) },
        undo_payload: None,
        idempotency_key: None,
    };
    RepairSessionStore::create(store, &session).expect("expired repair session seeds");
    id
}
