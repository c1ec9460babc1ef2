// solvereign-server/src/handlers/audit.rs
// ============================================================================
// Module: Audit Log Handlers
// Description: Paginated, tenant-scoped reads of the append-only audit chain.
// Purpose: GET /audit.
// Dependencies: solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;
use solvereign_core::ApiError;
use solvereign_core::AuditLogStore;

use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Query parameters for `GET /audit`.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Number of events to return, newest-last. Capped at [`MAX_LIMIT`].
    pub limit: Option<usize>,
    /// Number of events to skip from the start of the tenant's sequence.
    pub offset: Option<usize>,
}

/// Page of audit events plus the total count available for the tenant, so
/// callers can page without a second round trip.
#[derive(Debug, Serialize)]
pub struct AuditPage {
    /// Events in this page, sequence ascending.
    pub events: Vec<solvereign_core::AuditEvent>,
    /// Total number of events recorded for the tenant.
    pub total: usize,
}

/// `GET /audit`. The store has no native pagination, so the full
/// sequence-ordered chain is read and sliced in-handler; acceptable at this
/// scale since a tenant's chain is bounded by its own audit volume, not by
/// cross-tenant data.
pub async fn list(session: AuthenticatedSession, State(state): State<AppState>, Query(query): Query<AuditQuery>) -> Response {
    handle(|| {
        session.require("audit.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let all = AuditLogStore::list(state.store.as_ref(), &tenant_id)
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?;
        let total = all.len();
        let offset = query.offset.unwrap_or(0).min(total);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let events = all.into_iter().skip(offset).take(limit).collect();
        Ok(Json(AuditPage { events, total }).into_response())
    })
}

fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
