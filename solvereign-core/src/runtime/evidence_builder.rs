// solvereign-core/src/runtime/evidence_builder.rs
// ============================================================================
// Module: Solvereign Evidence Pack Builder
// Description: Assembles a self-verifying EvidencePack at publish time.
// Purpose: Implements C9 (Evidence Pack Builder).
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`build_evidence_pack`] takes the inputs already computed earlier in the
//! publish pipeline (solve input/output hashes, the policy profile actually
//! used, the gate's violation cache, the approvers who authorized the
//! publish) and assembles the [`EvidencePack`] that [`PlanLifecycleManager`]
//! embeds in the resulting [`Snapshot`]. Kept as a free function rather than
//! a struct since it has no state of its own beyond its arguments.
//!
//! [`PlanLifecycleManager`]: crate::runtime::lifecycle::PlanLifecycleManager

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ApiError;
use crate::core::ApproverInfo;
use crate::core::EvidencePack;
use crate::core::HashDigest;
use crate::core::PlanId;
use crate::core::PolicyProfileId;
use crate::core::TenantId;
use crate::core::Timestamp;
use crate::core::ViolationsCache;

/// Everything [`build_evidence_pack`] needs beyond the approver list, grouped
/// so the free function doesn't take a dozen positional arguments.
pub struct EvidenceInputs {
    /// Canonical hash of solve inputs.
    pub input_hash: HashDigest,
    /// Canonical hash of the derived constraint matrix.
    pub matrix_hash: HashDigest,
    /// Canonical hash of solve outputs.
    pub output_hash: HashDigest,
    /// Identifier of the policy profile used to derive the matrix.
    pub policy_profile_id: PolicyProfileId,
    /// Canonical hash of the policy profile's bytes.
    pub policy_hash: HashDigest,
    /// The policy profile's own canonical bytes.
    pub policy_profile_bytes: serde_json::Value,
    /// Solver seed used to produce `output_hash`.
    pub seed: u64,
    /// Canonical JSON of the published assignments.
    pub assignments: serde_json::Value,
}

/// Builds a self-verifying [`EvidencePack`] and computes its `evidence_hash`.
///
/// # Errors
///
/// Returns `ApiError::internal` when the pack's fields cannot be
/// canonicalized (non-finite floats in `assignments` or the policy bytes).
pub fn build_evidence_pack(
    tenant_id: TenantId,
    plan_version_id: PlanId,
    inputs: EvidenceInputs,
    violations: &ViolationsCache,
    approver_info: Vec<ApproverInfo>,
    published_at: Timestamp,
) -> Result<(EvidencePack, HashDigest), ApiError> {
    let audit_results = serde_json::json!({
        "block_count": violations.block_count,
        "warn_count": violations.warn_count,
        "violations": violations.violations,
        "evaluated_at": violations.evaluated_at,
    });
    let pack = EvidencePack {
        tenant_id,
        plan_version_id,
        input_hash: inputs.input_hash,
        matrix_hash: inputs.matrix_hash,
        output_hash: inputs.output_hash,
        policy_profile_id: inputs.policy_profile_id,
        policy_hash: inputs.policy_hash,
        policy_profile_bytes: inputs.policy_profile_bytes,
        seed: inputs.seed,
        audit_results,
        assignments: inputs.assignments,
        approver_info,
        published_at,
    };
    let hash = pack.evidence_hash().map_err(|err| ApiError::internal(&err.to_string()))?;
    Ok((pack, hash))
}
