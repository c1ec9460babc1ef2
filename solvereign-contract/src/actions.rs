// solvereign-contract/src/actions.rs
// ============================================================================
// Module: Action Catalog
// Description: Canonical HTTP action catalog for the Solvereign API surface.
// Purpose: Single source of truth for paths, permission keys, and schemas.
// Dependencies: solvereign-core, serde_json
// ============================================================================

//! ## Overview
//! Every mutating and read endpoint in the external interface is declared
//! once here. `solvereign-server` resolves its router and RBAC checks
//! against this catalog, `solvereign-system-tests` drives its scenarios off
//! the same paths, and `solvereign-contract`'s docs/schema generators read it
//! directly — so a new endpoint or a changed permission key can't silently
//! diverge between the three.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::schemas;
use crate::types::ApiAction;
use crate::types::HttpMethod;

/// Returns the canonical API action catalog, ordered as in the external
/// interface table.
#[must_use]
pub fn actions() -> Vec<ApiAction> {
    vec![
        action(
            "auth.login",
            HttpMethod::Post,
            "/auth/login",
            "Issue a session cookie for a verified email/password pair.",
            None,
            false,
            Some(schemas::login_request_schema()),
            schemas::session_schema(),
        ),
        action(
            "auth.logout",
            HttpMethod::Post,
            "/auth/logout",
            "Revoke the current session and clear the cookie.",
            None,
            false,
            None,
            schemas::empty_response_schema(),
        ),
        action(
            "auth.me",
            HttpMethod::Get,
            "/auth/me",
            "Describe the current session's user, tenant, and roles.",
            None,
            false,
            None,
            schemas::session_schema(),
        ),
        action(
            "plans.list",
            HttpMethod::Get,
            "/plans",
            "List plans in the tenant, filterable by site and state.",
            Some("plan.view"),
            false,
            None,
            schemas::plan_list_schema(),
        ),
        action(
            "plans.create",
            HttpMethod::Post,
            "/plans",
            "Create a DRAFT plan.",
            Some("plan.create"),
            true,
            Some(schemas::plan_create_request_schema()),
            schemas::plan_schema(),
        ),
        action(
            "plans.get",
            HttpMethod::Get,
            "/plans/{id}",
            "Fetch plan detail including state and assignment counts.",
            Some("plan.view"),
            false,
            None,
            schemas::plan_schema(),
        ),
        action(
            "plans.solve",
            HttpMethod::Post,
            "/plans/{id}/solve",
            "Start a solve; transitions the plan SOLVING -> SOLVED/FAILED.",
            Some("plan.solve"),
            true,
            None,
            schemas::plan_schema(),
        ),
        action(
            "snapshots.publish",
            HttpMethod::Post,
            "/snapshots/publish",
            "Publish a SOLVED plan; gated on BLOCK violations and approvals.",
            Some("plan.publish"),
            true,
            Some(schemas::publish_request_schema()),
            schemas::snapshot_schema(),
        ),
        action(
            "plans.lock",
            HttpMethod::Post,
            "/plans/{id}/lock",
            "Lock a PUBLISHED plan; requires an explicit confirm flag.",
            Some("plan.lock"),
            true,
            Some(schemas::lock_request_schema()),
            schemas::plan_schema(),
        ),
        action(
            "plans.matrix",
            HttpMethod::Get,
            "/plans/{id}/matrix",
            "Return a derived view of current assignments.",
            Some("plan.view"),
            false,
            None,
            schemas::matrix_schema(),
        ),
        action(
            "plans.violations",
            HttpMethod::Get,
            "/plans/{id}/violations",
            "Return the current BLOCK/WARN violations list.",
            Some("plan.view"),
            false,
            None,
            schemas::violations_schema(),
        ),
        action(
            "pins.create",
            HttpMethod::Post,
            "/plans/{id}/pins",
            "Add a pin constraining an entity to the plan.",
            Some("plan.repair"),
            true,
            Some(schemas::pin_create_request_schema()),
            schemas::pin_schema(),
        ),
        action(
            "pins.delete",
            HttpMethod::Delete,
            "/plans/{id}/pins/{pin_id}",
            "Remove a pin.",
            Some("plan.repair"),
            true,
            None,
            schemas::empty_response_schema(),
        ),
        action(
            "repairs.create",
            HttpMethod::Post,
            "/repairs/sessions",
            "Create a repair session; 409 if one is already OPEN for the plan version.",
            Some("plan.repair"),
            true,
            Some(schemas::repair_create_request_schema()),
            schemas::repair_session_schema(),
        ),
        action(
            "repairs.get",
            HttpMethod::Get,
            "/repairs/sessions/{sid}",
            "Read a repair session; may lazily transition to Expired.",
            Some("plan.repair"),
            false,
            None,
            schemas::repair_session_schema(),
        ),
        action(
            "repairs.apply",
            HttpMethod::Post,
            "/repairs/sessions/{sid}/apply",
            "Apply a repair session's queued changes.",
            Some("plan.repair"),
            true,
            Some(schemas::repair_apply_request_schema()),
            schemas::repair_session_schema(),
        ),
        action(
            "repairs.undo",
            HttpMethod::Post,
            "/repairs/sessions/{sid}/undo",
            "Undo a previously applied repair session.",
            Some("plan.repair"),
            true,
            None,
            schemas::repair_session_schema(),
        ),
        action(
            "repairs.abort",
            HttpMethod::Post,
            "/repairs/sessions/{sid}/abort",
            "Abort an OPEN repair session.",
            Some("plan.repair"),
            true,
            None,
            schemas::repair_session_schema(),
        ),
        action(
            "evidence.get",
            HttpMethod::Get,
            "/evidence/{snapshot_id}",
            "Fetch the evidence pack for a published snapshot.",
            Some("plan.view"),
            false,
            None,
            schemas::evidence_pack_schema(),
        ),
        action(
            "audit.list",
            HttpMethod::Get,
            "/audit",
            "Paginated audit event listing.",
            Some("plan.view"),
            false,
            None,
            schemas::audit_page_schema(),
        ),
        action(
            "health.live",
            HttpMethod::Get,
            "/health",
            "Liveness probe.",
            None,
            false,
            None,
            schemas::health_schema(),
        ),
        action(
            "health.ready",
            HttpMethod::Get,
            "/health/ready",
            "Readiness probe (database and dependency checks).",
            None,
            false,
            None,
            schemas::health_schema(),
        ),
    ]
}

/// Builds an [`ApiAction`] from its components.
#[allow(clippy::too_many_arguments, reason = "flat constructor mirrors the catalog table shape")]
fn action(
    key: &str,
    method: HttpMethod,
    path: &str,
    description: &str,
    required_permission: Option<&str>,
    idempotent: bool,
    request_schema: Option<Value>,
    response_schema: Value,
) -> ApiAction {
    ApiAction {
        key: key.to_string(),
        method,
        path: path.to_string(),
        description: description.to_string(),
        required_permission: required_permission.map(ToString::to_string),
        idempotent,
        request_schema,
        response_schema,
    }
}

/// Renders the action catalog as a markdown reference table.
#[must_use]
pub fn actions_markdown(actions: &[ApiAction]) -> String {
    let mut out = String::new();
    out.push_str("# Solvereign API Action Catalog\n\n");
    out.push_str("| Method | Path | Permission | Idempotent | Purpose |\n");
    out.push_str("| --- | --- | --- | --- | --- |\n");
    for entry in actions {
        let permission = entry.required_permission.as_deref().unwrap_or("none");
        let idempotent = if entry.idempotent { "yes" } else { "no" };
        out.push_str(&format!(
            "| {} | `{}` | `{}` | {} | {} |\n",
            entry.method.as_str(),
            entry.path,
            permission,
            idempotent,
            entry.description
        ));
    }
    out
}

/// Returns the action catalog as a JSON value (used by `ActionCatalog`).
#[must_use]
pub fn actions_json(actions: &[ApiAction]) -> Value {
    json!({ "version": env!("CARGO_PKG_VERSION"), "actions": actions })
}
