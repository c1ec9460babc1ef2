// solvereign-core/src/core/audit.rs
// ============================================================================
// Module: Solvereign Audit Log Model
// Description: Hash-chained, append-only audit event records.
// Purpose: Canonical type underlying C10 (Audit Log) and the tamper-evident chain.
// Dependencies: serde, crate::core::{hashing, identifiers, time}
// ============================================================================

//! ## Overview
//! Every mutating operation appends one [`AuditEvent`] row. Each row's
//! `entry_hash` commits to its own canonical payload plus the previous row's
//! `entry_hash`, forming a tamper-evident hash chain per tenant
//! ([`AuditEvent::compute_entry_hash`]/[`verify_chain`]). The first event for
//! a tenant chains from [`GENESIS_HASH`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_bytes;
use crate::core::identifiers::AuditEventId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

/// Fixed previous-hash value chained from by the first audit event of a tenant.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// SECTION: Audit Severity
// ============================================================================

/// Audit event severity. Most events are informational; a small set of
/// security- and override-relevant actions are marked `Warning` or `High` so
/// operators can filter the log for what needs review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditSeverity {
    /// Routine, expected action.
    Info,
    /// An override was used but within policy (e.g. a freeze-window publish).
    Warning,
    /// A high-risk override that bypassed a normal control (e.g. emergency approval override).
    High,
}

// ============================================================================
// SECTION: Audit Event
// ============================================================================

/// A single append-only audit log row.
///
/// # Invariants
/// - `sequence` is `prev_max + 1` within `tenant_id`.
/// - `entry_hash` equals [`AuditEvent::compute_entry_hash`] for this row's
///   own `prev_hash`, `action`, `actor_user_id`, `payload`, `severity`, and
///   `occurred_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub id: AuditEventId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Monotonic sequence number within the tenant, starting at 1.
    pub sequence: u64,
    /// Stable action name (e.g. `"plan.publish"`).
    pub action: String,
    /// Acting user, or `None` for system-initiated events.
    pub actor_user_id: Option<UserId>,
    /// Structured event payload (request parameters, resulting ids).
    pub payload: serde_json::Value,
    /// Severity this action was recorded at.
    pub severity: AuditSeverity,
    /// Previous event's `entry_hash`, or [`GENESIS_HASH`] for the first event.
    pub prev_hash: HashDigest,
    /// This event's own commitment hash.
    pub entry_hash: HashDigest,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

/// The subset of an [`AuditEvent`]'s fields that are hashed, kept separate so
/// `entry_hash` itself is never accidentally included in its own input.
#[derive(Serialize)]
struct AuditEventCommitment<'a> {
    prev_hash: &'a HashDigest,
    action: &'a str,
    actor_user_id: &'a Option<UserId>,
    payload: &'a serde_json::Value,
    severity: AuditSeverity,
    occurred_at: Timestamp,
}

impl AuditEvent {
    /// Computes the commitment hash for an event chained from `prev_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when `payload` cannot be
    /// canonicalized.
    pub fn compute_entry_hash(
        prev_hash: &HashDigest,
        action: &str,
        actor_user_id: &Option<UserId>,
        payload: &serde_json::Value,
        severity: AuditSeverity,
        occurred_at: Timestamp,
    ) -> Result<HashDigest, HashError> {
        let commitment = AuditEventCommitment {
            prev_hash,
            action,
            actor_user_id,
            payload,
            severity,
            occurred_at,
        };
        let bytes = canonical_json_bytes(&commitment)?;
        Ok(hash_bytes(HashAlgorithm::Sha256, &bytes))
    }

    /// Returns whether this row's stored `entry_hash` matches its own
    /// recomputed commitment.
    #[must_use]
    pub fn is_self_consistent(&self) -> bool {
        Self::compute_entry_hash(
            &self.prev_hash,
            &self.action,
            &self.actor_user_id,
            &self.payload,
            self.severity,
            self.occurred_at,
        )
        .is_ok_and(|expected| expected == self.entry_hash)
    }
}

/// Verifies that `events` (ordered by `sequence` ascending, for a single
/// tenant) form an unbroken hash chain from [`GENESIS_HASH`].
#[must_use]
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = HashDigest {
        algorithm: HashAlgorithm::Sha256,
        value: GENESIS_HASH.to_string(),
    };
    for event in events {
        if event.prev_hash != expected_prev || !event.is_self_consistent() {
            return false;
        }
        expected_prev = event.entry_hash.clone();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::AuditEvent;
    use super::AuditSeverity;
    use super::GENESIS_HASH;
    use super::verify_chain;
    use crate::core::hashing::HashAlgorithm;
    use crate::core::hashing::HashDigest;
    use crate::core::identifiers::AuditEventId;
    use crate::core::identifiers::TenantId;
    use crate::core::time::Timestamp;

    fn genesis() -> HashDigest {
        HashDigest {
            algorithm: HashAlgorithm::Sha256,
            value: GENESIS_HASH.to_string(),
        }
    }

    fn build_event(sequence: u64, prev_hash: HashDigest, payload: serde_json::Value) -> AuditEvent {
        let action = "plan.publish".to_string();
        let actor = None;
        let severity = AuditSeverity::Info;
        let occurred_at = Timestamp::from_unix_seconds(sequence as i64);
        let entry_hash =
            AuditEvent::compute_entry_hash(&prev_hash, &action, &actor, &payload, severity, occurred_at).unwrap();
        AuditEvent {
            id: AuditEventId::new(format!("evt-{sequence}")),
            tenant_id: TenantId::new("t1"),
            sequence,
            action,
            actor_user_id: actor,
            payload,
            severity,
            prev_hash,
            entry_hash,
            occurred_at,
        }
    }

    #[test]
    fn single_event_chain_from_genesis_verifies() {
        let event = build_event(1, genesis(), serde_json::json!({"plan_id": "p1"}));
        assert!(verify_chain(&[event]));
    }

    #[test]
    fn multi_event_chain_verifies_in_order() {
        let first = build_event(1, genesis(), serde_json::json!({"step": 1}));
        let second = build_event(2, first.entry_hash.clone(), serde_json::json!({"step": 2}));
        assert!(verify_chain(&[first, second]));
    }

    #[test]
    fn tampered_payload_breaks_self_consistency() {
        let mut event = build_event(1, genesis(), serde_json::json!({"step": 1}));
        event.payload = serde_json::json!({"step": 999});
        assert!(!event.is_self_consistent());
        assert!(!verify_chain(&[event]));
    }

    #[test]
    fn broken_prev_hash_link_fails_verification() {
        let first = build_event(1, genesis(), serde_json::json!({"step": 1}));
        let mut second = build_event(2, first.entry_hash.clone(), serde_json::json!({"step": 2}));
        second.prev_hash = genesis();
        assert!(!verify_chain(&[first, second]));
    }
}
