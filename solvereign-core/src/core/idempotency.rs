// solvereign-core/src/core/idempotency.rs
// ============================================================================
// Module: Solvereign Idempotency & Advisory Locking
// Description: Client idempotency-key records and per-plan advisory locks.
// Purpose: Canonical types underlying C11 (Concurrency Control) guarantees.
// Dependencies: serde, crate::core::{identifiers, hashing, time}
// ============================================================================

//! ## Overview
//! Mutating endpoints accept an optional client-supplied idempotency key.
//! [`IdempotencyRecord`] pairs that key with a hash of the request body so a
//! replayed call with an identical body returns the cached response, while a
//! reused key with a different body is rejected (`IDEMPOTENCY_CONFLICT`).
//! [`AdvisoryLock`] serializes concurrent mutation of a single plan without
//! requiring a database-level transaction per operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::IdempotencyActionKey;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::TenantId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Idempotency Record
// ============================================================================

/// Cached result of a client-scoped idempotent mutation.
///
/// # Invariants
/// - `(tenant_id, action_key)` is unique.
/// - A replay with a matching `request_hash` returns `response_snapshot` unchanged.
/// - A replay with a differing `request_hash` is an `IDEMPOTENCY_CONFLICT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Client-supplied idempotency key.
    pub action_key: IdempotencyActionKey,
    /// Canonical hash of the original request body.
    pub request_hash: HashDigest,
    /// Canonical JSON of the response returned on the first call.
    pub response_snapshot: serde_json::Value,
    /// Creation timestamp, used for retention pruning.
    pub created_at: Timestamp,
}

impl IdempotencyRecord {
    /// Returns whether a replayed call with `incoming_hash` matches the
    /// original request and may therefore be served from cache.
    #[must_use]
    pub fn matches(&self, incoming_hash: &HashDigest) -> bool {
        &self.request_hash == incoming_hash
    }
}

// ============================================================================
// SECTION: Advisory Lock
// ============================================================================

/// A held serialization lock over a single plan's mutation path.
///
/// # Invariants
/// - At most one live row per `plan_version_id`.
/// - Expired locks (`now >= expires_at`) are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryLock {
    /// Locked plan.
    pub plan_version_id: PlanId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Opaque token identifying the holder, echoed back on release.
    pub holder_token: String,
    /// Lease acquisition timestamp.
    pub acquired_at: Timestamp,
    /// Lease expiry; the lock is considered free once passed.
    pub expires_at: Timestamp,
}

impl AdvisoryLock {
    /// Returns whether this lock is still held at `now`.
    #[must_use]
    pub fn is_held(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::AdvisoryLock;
    use super::IdempotencyRecord;
    use crate::core::hashing::HashAlgorithm;
    use crate::core::hashing::hash_bytes;
    use crate::core::identifiers::IdempotencyActionKey;
    use crate::core::identifiers::PlanId;
    use crate::core::identifiers::TenantId;
    use crate::core::time::Timestamp;

    #[test]
    fn matching_request_hash_allows_replay() {
        let digest = hash_bytes(HashAlgorithm::Sha256, b"payload");
        let record = IdempotencyRecord {
            tenant_id: TenantId::new("t1"),
            action_key: IdempotencyActionKey::new("k1"),
            request_hash: digest.clone(),
            response_snapshot: serde_json::json!({"ok": true}),
            created_at: Timestamp::from_unix_seconds(0),
        };
        assert!(record.matches(&digest));
        let other = hash_bytes(HashAlgorithm::Sha256, b"different");
        assert!(!record.matches(&other));
    }

    #[test]
    fn lock_expires_at_boundary() {
        let lock = AdvisoryLock {
            plan_version_id: PlanId::new("p1"),
            tenant_id: TenantId::new("t1"),
            holder_token: "tok".to_string(),
            acquired_at: Timestamp::from_unix_seconds(0),
            expires_at: Timestamp::from_unix_seconds(10),
        };
        assert!(lock.is_held(Timestamp::from_unix_seconds(9)));
        assert!(!lock.is_held(Timestamp::from_unix_seconds(10)));
    }
}
