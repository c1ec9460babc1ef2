// solvereign-server/src/handlers/snapshots.rs
// ============================================================================
// Module: Snapshot & Lock Handlers
// Description: Publish-gated snapshot creation and plan locking.
// Purpose: POST /snapshots/publish, POST /plans/{id}/lock.
// Dependencies: solvereign-core, solvereign-rbac, axum, tokio
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
use solvereign_core::PlanLifecycleManager;
use solvereign_core::PublishEvidenceInputs;
use solvereign_core::SnapshotId;
use solvereign_core::UserStore;
use solvereign_core::hash_canonical_json;

use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::pipeline::current_timestamp;
use crate::pipeline::generate_trace_id;
use crate::pipeline::with_idempotency;
use crate::pipeline::with_plan_lock;
use crate::state::AppState;

/// Request body for `POST /snapshots/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Plan being published.
    pub plan_id: String,
    /// Operator-supplied publish reason, at least the configured minimum length.
    pub reason: String,
    /// Audited justification for publishing inside a predecessor's freeze
    /// window. When absent, a publish inside the window is refused.
    #[serde(default)]
    pub force_reason: Option<String>,
}

/// `POST /snapshots/publish`. Wrapped in the plan advisory lock and, when an
/// `Idempotency-Key` header is present, in idempotent-replay.
pub async fn publish(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PublishRequest>,
) -> Response {
    match publish_inner(&session, &state, &headers, request).await {
        Ok(response) => response,
        Err(error) => session.wrap(error).into_response(),
    }
}

async fn publish_inner(
    session: &AuthenticatedSession,
    state: &AppState,
    headers: &HeaderMap,
    request: PublishRequest,
) -> Result<Response, ApiError> {
    session.require("plan.publish").map_err(|_| ApiError::forbidden("plan.publish"))?;
    let tenant_id = require_tenant(&session.context)?;
    let plan_id = PlanId::new(request.plan_id.clone());
    let now = current_timestamp();

    let user = UserStore::get(state.store.as_ref(), &session.context.user_id)
        .map_err(|err| ApiError::internal(&err.to_string()))?
        .ok_or_else(|| ApiError::not_found("user"))?;

    let record = state.solve_cache.get(&tenant_id, &plan_id).ok_or_else(|| ApiError::not_found("solved assignments"))?;
    let matrix_hash =
        hash_canonical_json(HashAlgorithm::Sha256, &record.assignments).map_err(|err| ApiError::internal(&err.to_string()))?;

    let action_key = idempotency_key(headers);
    let request_hash = hash_canonical_json(
        HashAlgorithm::Sha256,
        &serde_json::json!({"plan_id": request.plan_id, "reason": request.reason, "force_reason": request.force_reason}),
    )
    .map_err(|err| ApiError::internal(&err.to_string()))?;

    let deadline = Duration::from_millis(state.config.server.lock_timeout_ms);
    let tenant_for_lock = tenant_id.clone();
    let plan_for_lock = plan_id.clone();
    let tenant_for_idempotency = tenant_id.clone();
    let reason = request.reason.clone();
    let force_reason = request.force_reason.clone();

    let response = with_plan_lock(state.store.as_ref(), &tenant_for_lock, &plan_for_lock, deadline, now, move || {
        with_idempotency(state.store.as_ref(), &tenant_for_idempotency, action_key.as_ref(), request_hash, now, move || {
            let manager = PlanLifecycleManager::new(state.store.as_ref());
            let (plan, snapshot) = manager.publish(
                &tenant_id,
                &plan_id,
                &user.id,
                &user.roles,
                &reason,
                &matrix_hash,
                SnapshotId::new(generate_trace_id()),
                PublishEvidenceInputs {
                    policy_profile_id: solvereign_core::PolicyProfileId::new(state.config.policy.profile_id.clone()),
                    policy_hash: state.config.policy.policy_hash().map_err(|err| ApiError::internal(&err.to_string()))?,
                    policy_profile_bytes: state.config.policy.to_canonical_value(),
                    assignments: record.assignments.clone(),
                },
                force_reason.as_deref(),
                now,
            )?;
            Ok(serde_json::json!({"plan": plan, "snapshot": snapshot}))
        })
    })
    .await?;

    Ok(Json(response).into_response())
}

fn idempotency_key(headers: &HeaderMap) -> Option<IdempotencyActionKey> {
    headers.get("idempotency-key").and_then(|value| value.to_str().ok()).map(IdempotencyActionKey::new)
}

/// Request body for `POST /plans/{id}/lock`.
#[derive(Debug, Deserialize)]
pub struct LockRequest {
    /// Operator-supplied lock reason.
    pub reason: String,
    /// Must be `true`; locking is irreversible and the explicit flag guards
    /// against an accidental call.
    #[serde(default)]
    pub confirm: bool,
}

/// `POST /plans/{id}/lock`.
pub async fn lock(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(request): Json<LockRequest>,
) -> Response {
    match lock_inner(&session, &state, plan_id, request) {
        Ok(response) => response,
        Err(error) => session.wrap(error).into_response(),
    }
}

fn lock_inner(session: &AuthenticatedSession, state: &AppState, plan_id: String, request: LockRequest) -> Result<Response, ApiError> {
    session.require("plan.lock").map_err(|_| ApiError::forbidden("plan.lock"))?;
    if !request.confirm {
        return Err(ApiError::new(
            solvereign_core::ErrorKind::Validation,
            "CONFIRM_REQUIRED",
            "locking a plan requires confirm=true",
        ));
    }
    let tenant_id = require_tenant(&session.context)?;
    let user = UserStore::get(state.store.as_ref(), &session.context.user_id)
        .map_err(|err| ApiError::internal(&err.to_string()))?
        .ok_or_else(|| ApiError::not_found("user"))?;

    let manager = PlanLifecycleManager::new(state.store.as_ref());
    let plan = manager.lock(&tenant_id, &PlanId::new(plan_id), &user.roles, &request.reason)?;
    Ok(Json(plan).into_response())
}
