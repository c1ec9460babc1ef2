// solvereign-server/src/handlers/pins.rs
// ============================================================================
// Module: Pin Handlers
// Description: Operator-declared driver/vehicle pins on a plan.
// Purpose: POST /plans/{id}/pins, DELETE /plans/{id}/pins/{pin_id}.
// Dependencies: solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use solvereign_core::ApiError;
use solvereign_core::Pin;
use solvereign_core::PinId;
use solvereign_core::PinStore;
use solvereign_core::PlanId;

use super::require_mutable_plan;
use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::pipeline::current_timestamp;
use crate::pipeline::generate_trace_id;
use crate::state::AppState;

/// Request body for `POST /plans/{id}/pins`.
#[derive(Debug, Deserialize)]
pub struct CreatePinRequest {
    /// Caller-chosen key identifying what this pin constrains, unique
    /// within the plan (e.g. a tour id).
    pub pin_key: String,
    /// Pin payload, interpreted by the solver at the next solve.
    pub payload: serde_json::Value,
}

/// `POST /plans/{id}/pins`. Refuses to add a pin to a `LOCKED` plan.
pub async fn create(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(request): Json<CreatePinRequest>,
) -> Response {
    handle(|| {
        session.require("plan.pin")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let plan_id = PlanId::new(plan_id);
        require_mutable_plan(state.store.as_ref(), &tenant_id, &plan_id).map_err(|err| session.wrap(err))?;
        let pin = Pin {
            id: PinId::new(generate_trace_id()),
            plan_version_id: plan_id,
            tenant_id,
            pin_key: request.pin_key,
            payload: request.payload,
            created_at: current_timestamp(),
        };
        PinStore::create(state.store.as_ref(), &pin).map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        Ok(Json(pin).into_response())
    })
}

/// `DELETE /plans/{id}/pins/{pin_id}`. `plan_id` is taken from the path to
/// refuse deletion once the plan is `LOCKED`; the store-level delete itself
/// is scoped by `(tenant_id, pin_id)` only, matching [`PinStore::delete`].
pub async fn delete(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Path((plan_id, pin_id)): Path<(String, String)>,
) -> Response {
    handle(|| {
        session.require("plan.pin")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        require_mutable_plan(state.store.as_ref(), &tenant_id, &PlanId::new(plan_id)).map_err(|err| session.wrap(err))?;
        PinStore::delete(state.store.as_ref(), &tenant_id, &PinId::new(pin_id))
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        Ok(Json(serde_json::json!({"ok": true})).into_response())
    })
}

fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
