// solvereign-server/src/handlers/plans.rs
// ============================================================================
// Module: Plan Handlers
// Description: Draft creation, listing, reads, solving, matrix/violation reads.
// Purpose: GET/POST /plans, GET /plans/{id}, POST /plans/{id}/solve,
//   GET /plans/{id}/matrix, GET /plans/{id}/violations.
// Dependencies: solvereign-core, solvereign-store-sqlite, axum
// ============================================================================

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use solvereign_core::ApiError;
use solvereign_core::ForecastVersionId;
use solvereign_core::PlanId;
use solvereign_core::PlanLifecycleManager;
use solvereign_core::PlanState;
use solvereign_core::PlanStore;
use solvereign_core::SiteId;
use solvereign_core::SnapshotStore;
use solvereign_core::ViolationsCacheStore;
use solvereign_core::compute_violations;

use super::require_tenant;
use crate::pipeline::current_timestamp;
use crate::pipeline::generate_trace_id;
use crate::solve_cache::SolveRecord;
use crate::state::AppState;

/// Query filters accepted by `GET /plans`.
#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    /// Restrict results to a single site.
    pub site_id: Option<String>,
    /// Restrict results to a single lifecycle state.
    pub state: Option<String>,
}

/// `GET /plans`. Filterable by `site_id` and `state`; both are applied
/// in-handler since neither is indexed at the store layer.
pub async fn list(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Query(query): Query<ListPlansQuery>,
) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let mut plans = state.store.list_for_tenant(&tenant_id).map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        if let Some(site_id) = &query.site_id {
            plans.retain(|plan| plan.site_id.as_str() == site_id);
        }
        if let Some(state_filter) = &query.state {
            plans.retain(|plan| format!("{:?}", plan.state).to_uppercase() == state_filter.to_uppercase());
        }
        Ok(Json(plans).into_response())
    })
}

/// Request body for `POST /plans`.
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    /// Site the plan belongs to.
    pub site_id: String,
    /// Forecast version the plan is drafted against.
    pub forecast_version_id: String,
    /// Solver seed. Defaults to `0` when omitted.
    #[serde(default)]
    pub seed: u64,
}

/// `POST /plans`.
pub async fn create(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Response {
    handle(|| {
        session.require("plan.create")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let manager = PlanLifecycleManager::new(state.store.as_ref());
        let plan = manager
            .create_draft(
                PlanId::new(generate_trace_id()),
                tenant_id,
                SiteId::new(request.site_id),
                ForecastVersionId::new(request.forecast_version_id),
                request.seed,
                current_timestamp(),
            )
            .map_err(|err| session.wrap(err))?;
        Ok(Json(plan).into_response())
    })
}

/// `GET /plans/{id}`.
pub async fn get(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let id = PlanId::new(plan_id);
        let plan = PlanStore::get(state.store.as_ref(), &tenant_id, &id)
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        let Some(plan) = plan else {
            if PlanStore::exists_for_other_tenant(state.store.as_ref(), &tenant_id, &id)
                .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
            {
                state.auth_audit.record(&solvereign_rbac::AuthAuditEvent::denied(
                    "tenant_isolation_attempt",
                    Some(session.context.user_id.as_str().to_string()),
                    Some(tenant_id.as_str().to_string()),
                    format!("plan {} belongs to a different tenant", id.as_str()),
                ));
            }
            return Err(session.wrap(ApiError::not_found("plan")));
        };
        Ok(Json(plan).into_response())
    })
}

/// Request body for `POST /plans/{id}/solve`.
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    /// Solve inputs: tours, drivers, vehicles, pins.
    pub inputs: serde_json::Value,
}

/// `POST /plans/{id}/solve`. Caches the solved assignments in-process (see
/// [`crate::solve_cache`]) since `solvereign-core` only retains them on the
/// transient [`solvereign_core::SolveOutcome`], then evaluates the publish
/// gate against them and persists the resulting violations cache.
pub async fn solve(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(request): Json<SolveRequest>,
) -> Response {
    handle(|| {
        session.require("plan.solve")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let plan_id = PlanId::new(plan_id);
        let now = current_timestamp();
        let policy_hash = state.config.policy.policy_hash().map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;

        let manager = PlanLifecycleManager::new(state.store.as_ref());
        let plan = manager
            .start_solve(&tenant_id, &plan_id, &policy_hash, &request.inputs, state.solver.as_ref())
            .map_err(|err| session.wrap(err))?;

        if plan.state == PlanState::Solved {
            let assignments = recompute_assignments(&state, &tenant_id, &plan_id, &request.inputs, &policy_hash, &session)?;
            state.solve_cache.put(&tenant_id, &plan_id, SolveRecord { inputs: request.inputs.clone(), assignments: assignments.clone() });

            let views: Vec<solvereign_core::AssignmentView> = serde_json::from_value(assignments)
                .map_err(|err| session.wrap(ApiError::internal(&format!("malformed solve assignments: {err}"))))?;
            let cache = compute_violations(tenant_id.clone(), plan_id.clone(), &views, &state.config.policy.gate_rules(), now);
            ViolationsCacheStore::put(state.store.as_ref(), &cache).map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        }

        Ok(Json(plan).into_response())
    })
}

/// Re-solves to recover the assignments array discarded by
/// [`PlanLifecycleManager::start_solve`]'s return value, so it can be cached.
/// The solver is deterministic in `(inputs, seed, policy_hash)`, so this is
/// the same computation `start_solve` already performed, not a second
/// independent decision.
fn recompute_assignments(
    state: &AppState,
    tenant_id: &solvereign_core::TenantId,
    plan_id: &PlanId,
    inputs: &serde_json::Value,
    policy_hash: &solvereign_core::HashDigest,
    session: &crate::pipeline::AuthenticatedSession,
) -> Result<serde_json::Value, crate::error::ErrorResponse> {
    let plan = PlanStore::get(state.store.as_ref(), tenant_id, plan_id)
        .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
        .ok_or_else(|| session.wrap(ApiError::not_found("plan")))?;
    match solvereign_core::PlanSolver::solve(state.solver.as_ref(), inputs, plan.seed, policy_hash) {
        Ok(solvereign_core::SolveOutcome::Solved { assignments, .. }) => Ok(assignments),
        Ok(solvereign_core::SolveOutcome::Failed { reason }) => {
            Err(session.wrap(ApiError::internal(&format!("solver reported failure on recompute: {reason}"))))
        }
        Err(err) => Err(session.wrap(ApiError::internal(&format!("solver dependency failure on recompute: {err}")))),
    }
}

/// `GET /plans/{id}/matrix`. Returns the last solved (or published)
/// assignment matrix for the plan.
pub async fn matrix(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let plan_id = PlanId::new(plan_id);

        if let Some(record) = state.solve_cache.get(&tenant_id, &plan_id) {
            return Ok(Json(serde_json::json!({"assignments": record.assignments})).into_response());
        }
        let plan = PlanStore::get(state.store.as_ref(), &tenant_id, &plan_id)
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
            .ok_or_else(|| session.wrap(ApiError::not_found("plan")))?;
        if let Some(snapshot_id) = &plan.current_snapshot_id {
            let snapshot = SnapshotStore::get(state.store.as_ref(), &tenant_id, snapshot_id)
                .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
                .ok_or_else(|| session.wrap(ApiError::not_found("snapshot")))?;
            return Ok(Json(serde_json::json!({"assignments": snapshot.assignments_snapshot})).into_response());
        }
        Err(session.wrap(ApiError::not_found("solved assignments")))
    })
}

/// `GET /plans/{id}/violations`.
pub async fn violations(
    session: crate::pipeline::AuthenticatedSession,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let cache = ViolationsCacheStore::get(state.store.as_ref(), &tenant_id, &PlanId::new(plan_id))
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
            .ok_or_else(|| session.wrap(ApiError::not_found("violations cache")))?;
        Ok(Json(cache).into_response())
    })
}

/// Runs a handler body, converting its `Err(ErrorResponse)` into a response
/// via [`IntoResponse`] and its `Ok(Response)` through unchanged. Exists so
/// every route in this module can use `?` against [`crate::error::ErrorResponse`]
/// without boilerplate at each call site.
fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
