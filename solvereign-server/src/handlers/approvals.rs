// solvereign-server/src/handlers/approvals.rs
// ============================================================================
// Module: Approval Handlers
// Description: Risk-gated approval request lifecycle, including emergency
//   override, exposed beyond the plan lifecycle so any risk-bearing action
//   can route through the same audited workflow.
// Purpose: POST /approvals, GET /approvals/{id}, POST /approvals/{id}/decide,
//   POST /approvals/{id}/override.
// Dependencies: solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use solvereign_core::ApiError;
use solvereign_core::ApprovalEngine;
use solvereign_core::ApprovalRequestId;
use solvereign_core::ApprovalRequestStore;
use solvereign_core::DecisionVote;
use solvereign_core::RiskTier;

use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::pipeline::current_timestamp;
use crate::pipeline::generate_trace_id;
use crate::state::AppState;

/// Request body for `POST /approvals`.
#[derive(Debug, Deserialize)]
pub struct CreateApprovalRequest {
    /// Gated action name (e.g. `"plan.publish"`).
    pub action: String,
    /// Entity the action applies to.
    pub entity: serde_json::Value,
    /// Risk tier driving the required approval threshold.
    pub risk_tier: RiskTier,
}

/// `POST /approvals`.
pub async fn create(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateApprovalRequest>,
) -> Response {
    handle(|| {
        session.require("approval.manage")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = ApprovalEngine::new(state.store.as_ref());
        let approval = engine
            .request(
                ApprovalRequestId::new(generate_trace_id()),
                tenant_id,
                request.action,
                request.entity,
                request.risk_tier,
                current_timestamp(),
            )
            .map_err(|err| session.wrap(err))?;
        Ok(Json(approval).into_response())
    })
}

/// `GET /approvals/{id}`.
pub async fn get(session: AuthenticatedSession, State(state): State<AppState>, Path(request_id): Path<String>) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let approval = ApprovalRequestStore::get(state.store.as_ref(), &tenant_id, &ApprovalRequestId::new(request_id))
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
            .ok_or_else(|| session.wrap(ApiError::not_found("approval request")))?;
        Ok(Json(approval).into_response())
    })
}

/// Request body for `POST /approvals/{id}/decide`.
#[derive(Debug, Deserialize)]
pub struct DecideApprovalRequest {
    /// Vote being cast.
    pub vote: DecisionVote,
    /// Reason recorded alongside the decision.
    pub reason: String,
}

/// `POST /approvals/{id}/decide`.
pub async fn decide(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(request): Json<DecideApprovalRequest>,
) -> Response {
    handle(|| {
        session.require("approval.manage")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = ApprovalEngine::new(state.store.as_ref());
        let approval = engine
            .decide(
                &tenant_id,
                &ApprovalRequestId::new(request_id),
                session.context.user_id.clone(),
                request.vote,
                request.reason,
                current_timestamp(),
            )
            .map_err(|err| session.wrap(err))?;
        Ok(Json(approval).into_response())
    })
}

/// Request body for `POST /approvals/{id}/override`.
#[derive(Debug, Deserialize)]
pub struct OverrideApprovalRequest {
    /// Reason recorded alongside the override, subject to the mandatory
    /// post-hoc review window.
    pub reason: String,
}

/// `POST /approvals/{id}/override`. Bypasses the approval threshold and
/// records a high-severity audit entry noting the mandatory post-hoc review.
pub async fn override_decision(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(request): Json<OverrideApprovalRequest>,
) -> Response {
    handle(|| {
        session.require("approval.override")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let engine = ApprovalEngine::new(state.store.as_ref());
        let approval = engine
            .emergency_override(&tenant_id, &ApprovalRequestId::new(request_id), session.context.user_id.clone(), request.reason, current_timestamp())
            .map_err(|err| session.wrap(err))?;
        Ok(Json(approval).into_response())
    })
}

fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
