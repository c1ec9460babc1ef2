// solvereign-server/src/handlers/evidence.rs
// ============================================================================
// Module: Evidence Handlers
// Description: Read-only access to a published snapshot's evidence fields.
// Purpose: GET /evidence/{snapshot_id}.
// Dependencies: solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use solvereign_core::ApiError;
use solvereign_core::SnapshotId;
use solvereign_core::SnapshotStore;

use super::require_tenant;
use crate::pipeline::AuthenticatedSession;
use crate::state::AppState;

/// Evidence view returned for a published snapshot. Mirrors the fields
/// [`solvereign_core::build_evidence_pack`] committed into the hash at
/// publish time, read back from the snapshot rather than recomputed.
#[derive(Debug, Serialize)]
pub struct EvidenceView {
    /// Snapshot identifier.
    pub snapshot_id: String,
    /// Owning plan version.
    pub plan_version_id: String,
    /// Monotonic version number within the plan.
    pub version_number: u32,
    /// Publish timestamp.
    pub published_at: solvereign_core::Timestamp,
    /// Approver who published.
    pub published_by: String,
    /// Operator-supplied publish reason.
    pub publish_reason: String,
    /// Input hash at publish time.
    pub input_hash: solvereign_core::HashDigest,
    /// Derived-matrix hash at publish time.
    pub matrix_hash: solvereign_core::HashDigest,
    /// Output hash at publish time.
    pub output_hash: solvereign_core::HashDigest,
    /// Evidence pack hash.
    pub evidence_hash: solvereign_core::HashDigest,
    /// Canonical JSON of the assignments at publish time.
    pub assignments_snapshot: serde_json::Value,
    /// Canonical JSON of the audit/violation results at publish time.
    pub audit_results_snapshot: serde_json::Value,
}

/// `GET /evidence/{snapshot_id}`.
pub async fn get(session: AuthenticatedSession, State(state): State<AppState>, Path(snapshot_id): Path<String>) -> Response {
    handle(|| {
        session.require("plan.view")?;
        let tenant_id = require_tenant(&session.context).map_err(|err| session.wrap(err))?;
        let snapshot = SnapshotStore::get(state.store.as_ref(), &tenant_id, &SnapshotId::new(snapshot_id))
            .map_err(|err| session.wrap(ApiError::internal(&err.to_string())))?
            .ok_or_else(|| session.wrap(ApiError::not_found("snapshot")))?;
        Ok(Json(EvidenceView {
            snapshot_id: snapshot.id.as_str().to_string(),
            plan_version_id: snapshot.plan_version_id.as_str().to_string(),
            version_number: snapshot.version_number,
            published_at: snapshot.published_at,
            published_by: snapshot.published_by.as_str().to_string(),
            publish_reason: snapshot.publish_reason,
            input_hash: snapshot.input_hash,
            matrix_hash: snapshot.matrix_hash,
            output_hash: snapshot.output_hash,
            evidence_hash: snapshot.evidence_hash,
            assignments_snapshot: snapshot.assignments_snapshot,
            audit_results_snapshot: snapshot.audit_results_snapshot,
        })
        .into_response())
    })
}

fn handle(body: impl FnOnce() -> Result<Response, crate::error::ErrorResponse>) -> Response {
    body().unwrap_or_else(IntoResponse::into_response)
}
