// solvereign-server/src/handlers/health.rs
// ============================================================================
// Module: Health Handlers
// Description: Liveness and readiness probes.
// Purpose: GET /health and GET /health/ready.
// Dependencies: solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use solvereign_core::TenantId;

use crate::state::AppState;

/// `GET /health`. Always `200` once the process is up; does not touch the
/// store.
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /health/ready`. Probes the store with a cheap, always-empty read so
/// a wedged database connection fails readiness rather than liveness.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let probe_tenant = TenantId::new("__health_probe__");
    match solvereign_core::KillSwitchStore::is_enabled(state.store.as_ref(), &probe_tenant, &solvereign_core::SiteId::new("__health_probe__"), "publish") {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"status": "ready"}))),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({"status": "unavailable", "error": err.to_string()}))),
    }
}
