// solvereign-server/src/handlers/mod.rs
// ============================================================================
// Module: Route Handlers
// Description: One module per resource group in the REST surface.
// Purpose: Each handler extracts an `AuthenticatedSession`, enforces its
//   route's permission, delegates to a `solvereign-core` runtime engine, and
//   maps the result to JSON or an `ErrorResponse`.
// Dependencies: solvereign-core, solvereign-rbac, axum
// ============================================================================

pub mod approvals;
pub mod audit;
pub mod auth;
pub mod evidence;
pub mod health;
pub mod pins;
pub mod plans;
pub mod repairs;
pub mod snapshots;

/// Requires the request carries a tenant-scoped session, rejecting a
/// platform-scope (tenant-less) caller with `NOT_FOUND` rather than
/// `FORBIDDEN`, so platform scope cannot be distinguished from "wrong
/// tenant" by a caller probing tenant-scoped routes.
pub(crate) fn require_tenant(
    context: &solvereign_rbac::SessionContext,
) -> Result<solvereign_core::TenantId, solvereign_core::ApiError> {
    context.tenant_id.clone().ok_or_else(|| solvereign_core::ApiError::not_found("tenant"))
}

/// Loads a plan and rejects any further mutation once it is `LOCKED`.
/// Every handler that mutates plan-scoped state (pins, repair sessions) must
/// call this before writing, since locking is meant to be irreversible.
pub(crate) fn require_mutable_plan<Store: solvereign_core::PlanStore>(
    store: &Store,
    tenant_id: &solvereign_core::TenantId,
    plan_id: &solvereign_core::PlanId,
) -> Result<solvereign_core::PlanVersion, solvereign_core::ApiError> {
    let plan = solvereign_core::PlanStore::get(store, tenant_id, plan_id)
        .map_err(|err| solvereign_core::ApiError::internal(&err.to_string()))?
        .ok_or_else(|| solvereign_core::ApiError::not_found("plan"))?;
    if plan.state == solvereign_core::PlanState::Locked {
        return Err(solvereign_core::ApiError::already_locked());
    }
    Ok(plan)
}
