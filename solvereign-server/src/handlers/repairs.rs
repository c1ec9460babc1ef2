// solvereign-server/src/handlers/repairs.rs
// ============================================================================
// Module: Repair Session Handlers
// Description: Preview/apply/undo/abort over RepairSessionEngine.
// Purpose: POST /repairs/sessions, GET /repairs/sessions/{id},
//   POST /repairs/sessions/{id}/apply, /undo, /abort.
// Dependencies: solvereign-core, axum, tokio
// ============================================================================

use std::time::Duration;

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use solvereign_core::ApiError;
use solvereign_core::HashAlgorithm;
use solvereign_core::IdempotencyActionKey;
use solvereign_core::PlanId;
use solvereign_core::RepairSessionEngine;
use solvereign_core::RepairSessionId;
use solvereign_core::hash_canonical_json;

use super::require_mutable_plan;
use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::pipeline::current_timestamp;
use crate::pipeline::generate_trace_id;
use crate::pipeline::with_plan_lock;
use crate::state::AppState;

fn idempotency_key(headers: &HeaderMap) -> Option<IdempotencyActionKey> {
    headers.get("idempotency-key").and_then(|value| value.to_str().ok()).map(IdempotencyActionKey::new)
}

/// Request body for `POST /repairs/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateRepairRequest {
    /// Plan the session proposes changes against.
    pub plan_id: String,
    /// Caller-supplied requested changes (pins, reassignments, etc).
    pub requested_changes: serde_json::Value,
    /// Caller-computed preview diff against the plan's live assignments.
    /// Computing this diff is a solver/projection concern outside this
    /// crate; the caller supplies it.
    pub preview_payload: serde_json::Value,
}

/// `POST /repairs/sessions`. Held under the plan's advisory lock so the
/// single-open-session invariant cannot race a concurrent create.
pub async fn create(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateRepairRequest>,
) -> Response {
    match create_inner(&session, &state, &headers, request).await {
        Ok(response) => response,
        Err(error) => session.wrap(error).into_response(),
    }
}

async fn create_inner(
    session: &AuthenticatedSession,
    state: &AppState,
    headers: &HeaderMap,
    request: CreateRepairRequest,
) -> Result<Response, ApiError> {
    session.require("plan.repair").map_err(|_| ApiError::forbidden("plan.repair"))?;
    let tenant_id = require_tenant(&session.context)?;
    let plan_id = PlanId::new(request.plan_id);
    require_mutable_plan(state.store.as_ref(), &tenant_id, &plan_id)?;
    let now = current_timestamp();
    let action_key = idempotency_key(headers);

    let record = state.solve_cache.get(&tenant_id, &plan_id).ok_or_else(|| ApiError::not_found("solved assignments"))?;
    let baseline_assignments_hash =
        hash_canonical_json(HashAlgorithm::Sha256, &record.assignments).map_err(|err| ApiError::internal(&err.to_string()))?;

    let deadline = Duration::from_millis(state.config.server.lock_timeout_ms);
    let user_id = session.context.user_id.clone();
    let tenant_for_lock = tenant_id.clone();
    let plan_for_lock = plan_id.clone();

    let created = with_plan_lock(state.store.as_ref(), &tenant_for_lock, &plan_for_lock, deadline, now, move || {
        let engine = RepairSessionEngine::new(state.store.as_ref());
        engine.create(
            RepairSessionId::new(generate_trace_id()),
            tenant_id,
            plan_id,
            user_id,
            request.requested_changes,
            request.preview_payload,
            baseline_assignments_hash,
            action_key,
            now,
        )
    })
    .await?;

    Ok(Json(created).into_response())
}

/// `GET /repairs/sessions/{id}`.
pub async fn get(session: AuthenticatedSession, State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = RepairSessionEngine::new(state.store.as_ref());
        let repair = engine
            .get(&tenant_id, &RepairSessionId::new(session_id), current_timestamp())
            .map_err(|err| session.wrap(err))?;
        Ok(Json(repair).into_response())
    })
}

/// `POST /repairs/sessions/{id}/apply`. Held under the plan's advisory lock.
/// The preview is re-run server-side under that lock and compared against
/// the hash captured at creation; the client supplies no drift signal.
pub async fn apply(session: AuthenticatedSession, State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match apply_inner(&session, &state, session_id).await {
        Ok(response) => response,
        Err(error) => session.wrap(error).into_response(),
    }
}

async fn apply_inner(session: &AuthenticatedSession, state: &AppState, session_id: String) -> Result<Response, ApiError> {
    session.require("plan.repair").map_err(|_| ApiError::forbidden("plan.repair"))?;
    let tenant_id = require_tenant(&session.context)?;
    let now = current_timestamp();
    let id = RepairSessionId::new(session_id);

    let engine = RepairSessionEngine::new(state.store.as_ref());
    let existing = engine.get(&tenant_id, &id, now)?;
    require_mutable_plan(state.store.as_ref(), &tenant_id, &existing.plan_version_id)?;
    let deadline = Duration::from_millis(state.config.server.lock_timeout_ms);
    let tenant_for_lock = tenant_id.clone();
    let plan_for_lock = existing.plan_version_id.clone();

    let applied = with_plan_lock(state.store.as_ref(), &tenant_for_lock, &plan_for_lock, deadline, now, move || {
        let record = state
            .solve_cache
            .get(&tenant_id, &existing.plan_version_id)
            .ok_or_else(|| ApiError::not_found("solved assignments"))?;
        let current_assignments_hash = hash_canonical_json(HashAlgorithm::Sha256, &record.assignments)
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        let engine = RepairSessionEngine::new(state.store.as_ref());
        engine.apply(&tenant_id, &id, &current_assignments_hash, now)
    })
    .await?;

    Ok(Json(applied).into_response())
}

/// `POST /repairs/sessions/{id}/undo`. Restores the plan's prior state in
/// place; this never mints a new plan version.
pub async fn undo(session: AuthenticatedSession, State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    handle(|| {
        session.require("plan.repair")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = RepairSessionEngine::new(state.store.as_ref());
        let repair = engine
            .undo(&tenant_id, &RepairSessionId::new(session_id), current_timestamp())
            .map_err(|err| session.wrap(err))?;
        Ok(Json(repair).into_response())
    })
}

/// `POST /repairs/sessions/{id}/abort`. Abandons an open session without
/// applying it.
pub async fn abort(session: AuthenticatedSession, State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    handle(|| {
        session.require("plan.repair")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = RepairSessionEngine::new(state.store.as_ref());
        let repair = engine
            .abort(&tenant_id, &RepairSessionId::new(session_id), current_timestamp())
            .map_err(|err| session.wrap(err))?;
        Ok(Json(repair).into_response())
    })
}

fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
