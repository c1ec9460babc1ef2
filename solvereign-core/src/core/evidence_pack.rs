// solvereign-core/src/core/evidence_pack.rs
// ============================================================================
// Module: Solvereign Evidence Pack Model
// Description: Content-hashed bundle of publish-time inputs, outputs, and audit results.
// Purpose: Canonical type underlying C9 (Evidence Pack Builder).
// Dependencies: serde, crate::core::{hashing, identifiers, time}
// ============================================================================

//! ## Overview
//! An [`EvidencePack`] is the self-verifying bundle materialized on every
//! publish. Per the resolved Open Question on policy embedding, the policy
//! profile's canonical bytes are carried inline alongside `policy_hash`
//! rather than referenced by id, so a pack can be independently re-verified
//! without access to the profile store that produced it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::PolicyProfileId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Approver Info
// ============================================================================

/// Identity of the approver(s) who authorized the publish that produced an
/// [`EvidencePack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverInfo {
    /// Approving user.
    pub approver_id: UserId,
    /// Roles held by the approver at decision time.
    pub roles: Vec<String>,
    /// Decision timestamp.
    pub decided_at: Timestamp,
}

// ============================================================================
// SECTION: Evidence Pack
// ============================================================================

/// Content-hashed publish-time bundle (spec §3, §4.9).
///
/// # Invariants
/// - `evidence_hash = H(canonical(self_without_evidence_hash))`.
/// - Rebuilding a pack from the same stored bytes yields an identical hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePack {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Plan this pack was built for.
    pub plan_version_id: PlanId,
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
    /// The policy profile's own canonical bytes, embedded so the pack is
    /// self-verifying without a side channel to the profile store.
    pub policy_profile_bytes: serde_json::Value,
    /// Solver seed used to produce `output_hash`.
    pub seed: u64,
    /// Canonical JSON of the gate's audit/violation results at publish time.
    pub audit_results: serde_json::Value,
    /// Canonical JSON of the published assignments.
    pub assignments: serde_json::Value,
    /// Approver(s) who authorized this publish.
    pub approver_info: Vec<ApproverInfo>,
    /// Publish timestamp.
    pub published_at: Timestamp,
}

/// The subset of [`EvidencePack`] that is hashed to produce `evidence_hash`,
/// i.e. every field of the pack itself (the hash is never computed over
/// itself).
#[derive(Serialize)]
struct EvidenceCommitment<'a> {
    tenant_id: &'a TenantId,
    plan_version_id: &'a PlanId,
    input_hash: &'a HashDigest,
    matrix_hash: &'a HashDigest,
    output_hash: &'a HashDigest,
    policy_profile_id: &'a PolicyProfileId,
    policy_hash: &'a HashDigest,
    policy_profile_bytes: &'a serde_json::Value,
    seed: u64,
    audit_results: &'a serde_json::Value,
    assignments: &'a serde_json::Value,
    approver_info: &'a [ApproverInfo],
    published_at: Timestamp,
}

impl EvidencePack {
    /// Computes `evidence_hash = H(canonical(pack))` for this pack.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when the pack cannot be
    /// canonicalized (e.g. `audit_results`/`assignments` contain non-finite
    /// floats).
    pub fn evidence_hash(&self) -> Result<HashDigest, HashError> {
        let commitment = EvidenceCommitment {
            tenant_id: &self.tenant_id,
            plan_version_id: &self.plan_version_id,
            input_hash: &self.input_hash,
            matrix_hash: &self.matrix_hash,
            output_hash: &self.output_hash,
            policy_profile_id: &self.policy_profile_id,
            policy_hash: &self.policy_hash,
            policy_profile_bytes: &self.policy_profile_bytes,
            seed: self.seed,
            audit_results: &self.audit_results,
            assignments: &self.assignments,
            approver_info: &self.approver_info,
            published_at: self.published_at,
        };
        hash_canonical_json(HashAlgorithm::Sha256, &commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::ApproverInfo;
    use super::EvidencePack;
    use crate::core::hashing::HashAlgorithm;
    use crate::core::hashing::hash_bytes;
    use crate::core::identifiers::PlanId;
    use crate::core::identifiers::PolicyProfileId;
    use crate::core::identifiers::TenantId;
    use crate::core::identifiers::UserId;
    use crate::core::time::Timestamp;

    fn sample_pack() -> EvidencePack {
        let digest = hash_bytes(HashAlgorithm::Sha256, b"x");
        EvidencePack {
            tenant_id: TenantId::new("t1"),
            plan_version_id: PlanId::new("p1"),
            input_hash: digest.clone(),
            matrix_hash: digest.clone(),
            output_hash: digest.clone(),
            policy_profile_id: PolicyProfileId::new("profile-1"),
            policy_hash: digest,
            policy_profile_bytes: serde_json::json!({"rules": []}),
            seed: 42,
            audit_results: serde_json::json!({"block_count": 0}),
            assignments: serde_json::json!([]),
            approver_info: vec![ApproverInfo {
                approver_id: UserId::new("u1"),
                roles: vec!["operator_admin".to_string()],
                decided_at: Timestamp::from_unix_seconds(1),
            }],
            published_at: Timestamp::from_unix_seconds(2),
        }
    }

    #[test]
    fn rebuilding_from_identical_fields_yields_identical_hash() {
        let pack = sample_pack();
        let first = pack.evidence_hash().unwrap();
        let second = pack.evidence_hash().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn differing_assignments_change_the_hash() {
        let mut pack = sample_pack();
        let original_hash = pack.evidence_hash().unwrap();
        pack.assignments = serde_json::json!([{"tour_id": "t1"}]);
        assert_ne!(pack.evidence_hash().unwrap(), original_hash);
    }
}
