// solvereign-core/src/runtime/repair_engine.rs
// ============================================================================
// Module: Solvereign Repair Session Engine
// Description: create/get/apply/abort orchestration over RepairSessionStore.
// Purpose: Implements C6 (Repair Session Engine).
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`RepairSessionEngine`] coordinates the preview/apply/undo workflow
//! described in spec §4.6. Computing the actual `requested_changes` diff
//! against a plan's current assignments is a solver/projection concern
//! outside this crate; the engine takes the caller-supplied preview payload
//! and a hash of the plan's assignments at preview time, and is responsible
//! for the session state machine, the single-open-session invariant,
//! expiry, and judging drift at apply time by recomputing that hash rather
//! than trusting the caller to report it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ApiError;
use crate::core::ErrorKind;
use crate::core::HashDigest;
use crate::core::IdempotencyActionKey;
use crate::core::PlanId;
use crate::core::RepairSession;
use crate::core::RepairSessionId;
use crate::core::RepairStatus;
use crate::core::TenantId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::RepairSessionStore;

/// Default repair session TTL, per spec §4.6.
pub const DEFAULT_TTL_SECONDS: i64 = 30 * 60;

/// Orchestrates repair session transitions over a store implementing
/// [`RepairSessionStore`].
pub struct RepairSessionEngine<'a, Store> {
    store: &'a Store,
    ttl_seconds: i64,
}

impl<'a, Store: RepairSessionStore> RepairSessionEngine<'a, Store> {
    /// Builds an engine with the spec-default TTL.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            store,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// `create(plan_id, requested_changes, user, idempotency_key)` (spec
    /// §4.6). Preconditions 1 (plan not locked) and 2 (advisory lock
    /// acquisition) are the caller's responsibility (the request pipeline
    /// holds the lock for the duration of this call); this method enforces
    /// precondition 3, the single-open-session invariant, via the store's
    /// `create` contract.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` with code `SESSION_ALREADY_EXISTS` when an open
    /// session already exists for the plan, or `ApiError::internal` on
    /// store failure.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        id: RepairSessionId,
        tenant_id: TenantId,
        plan_version_id: PlanId,
        created_by: UserId,
        requested_changes: serde_json::Value,
        preview_payload: serde_json::Value,
        baseline_assignments_hash: HashDigest,
        idempotency_key: Option<IdempotencyActionKey>,
        now: Timestamp,
    ) -> Result<RepairSession, ApiError> {
        let session = RepairSession {
            id,
            tenant_id,
            plan_version_id,
            created_by,
            created_at: now,
            expires_at: now.plus_seconds(self.ttl_seconds),
            status: RepairStatus::Open,
            requested_changes,
            preview_payload,
            baseline_assignments_hash,
            undo_payload: None,
            idempotency_key,
        };
        self.store.create(&session).map_err(|err| {
            if err.to_string().contains("already exists") {
                ApiError::session_already_exists()
            } else {
                ApiError::internal(&err.to_string())
            }
        })?;
        Ok(session)
    }

    /// `get(session_id)` (spec §4.6). Lazily transitions an `Open` session
    /// that has crossed its TTL to `Expired` and persists that transition.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::session_not_found` if unknown, or
    /// `ApiError::internal` on store failure.
    pub fn get(
        &self,
        tenant_id: &TenantId,
        id: &RepairSessionId,
        now: Timestamp,
    ) -> Result<RepairSession, ApiError> {
        let mut session = self
            .store
            .get(tenant_id, id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .ok_or_else(ApiError::session_not_found)?;
        if session.has_lapsed(now) {
            session.status = RepairStatus::Expired;
            self.store.update(&session).map_err(|err| ApiError::internal(&err.to_string()))?;
        }
        Ok(session)
    }

    /// `apply(session_id, approver, idempotency_key)` (spec §4.6). The caller
    /// re-runs the preview under the advisory lock and passes in the
    /// resulting `current_assignments_hash`; this method is the sole judge
    /// of drift, comparing it against the hash captured at `create` time,
    /// since a client-supplied drift flag cannot be trusted. On success, the
    /// session's own `preview_payload` (computed at creation, against the
    /// plan state this apply has just confirmed is unchanged) becomes the
    /// stored undo payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::session_expired`, `PREVIEW_STALE` on drift, or
    /// `ApiError::internal` on store failure. Returns a
    /// `SESSION_NOT_FOUND`-equivalent precondition error when the session is
    /// not `Open`.
    pub fn apply(
        &self,
        tenant_id: &TenantId,
        id: &RepairSessionId,
        current_assignments_hash: &HashDigest,
        now: Timestamp,
    ) -> Result<RepairSession, ApiError> {
        let mut session = self.get(tenant_id, id, now)?;
        if session.status == RepairStatus::Expired {
            return Err(ApiError::session_expired());
        }
        if session.status != RepairStatus::Open {
            return Err(ApiError::new(
                ErrorKind::State,
                "SESSION_NOT_OPEN",
                format!("repair session is {:?}, not open", session.status),
            ));
        }
        if current_assignments_hash != &session.baseline_assignments_hash {
            return Err(ApiError::preview_stale());
        }
        session.status = RepairStatus::Applied;
        session.undo_payload = Some(session.preview_payload.clone());
        self.store.update(&session).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(session)
    }

    /// Restores the plan's prior state in place via the stored
    /// `undo_payload`, moving the session to the `Undone` terminal state.
    /// This never mints a new plan version (resolved Open Question).
    ///
    /// # Errors
    ///
    /// Returns a state error when the session is not `Applied`, or
    /// `ApiError::internal` on store failure.
    pub fn undo(&self, tenant_id: &TenantId, id: &RepairSessionId, now: Timestamp) -> Result<RepairSession, ApiError> {
        let mut session = self.get(tenant_id, id, now)?;
        if session.status != RepairStatus::Applied {
            return Err(ApiError::new(
                ErrorKind::State,
                "SESSION_NOT_APPLIED",
                format!("repair session is {:?}, not applied", session.status),
            ));
        }
        session.status = RepairStatus::Undone;
        self.store.update(&session).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(session)
    }

    /// Abandons an `Open` session without applying it.
    ///
    /// # Errors
    ///
    /// Returns a state error when the session is not `Open`, or
    /// `ApiError::internal` on store failure.
    pub fn abort(&self, tenant_id: &TenantId, id: &RepairSessionId, now: Timestamp) -> Result<RepairSession, ApiError> {
        let mut session = self.get(tenant_id, id, now)?;
        if session.status != RepairStatus::Open {
            return Err(ApiError::new(
                ErrorKind::State,
                "SESSION_NOT_OPEN",
                format!("repair session is {:?}, not open", session.status),
            ));
        }
        session.status = RepairStatus::Aborted;
        self.store.update(&session).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::RepairSessionEngine;
    use crate::core::HashAlgorithm;
    use crate::core::HashDigest;
    use crate::core::IdempotencyActionKey;
    use crate::core::PlanId;
    use crate::core::RepairSessionId;
    use crate::core::RepairStatus;
    use crate::core::TenantId;
    use crate::core::Timestamp;
    use crate::core::UserId;
    use crate::runtime::store::InMemoryStore;

    fn baseline_hash() -> HashDigest {
        HashDigest { algorithm: HashAlgorithm::Sha256, value: "a".repeat(64) }
    }

    fn drifted_hash() -> HashDigest {
        HashDigest { algorithm: HashAlgorithm::Sha256, value: "b".repeat(64) }
    }

    fn open_session(engine: &RepairSessionEngine<InMemoryStore>, now: Timestamp) -> (TenantId, RepairSessionId) {
        let tenant_id = TenantId::new("t1");
        let id = RepairSessionId::new("r1");
        engine
            .create(
                id.clone(),
                tenant_id.clone(),
                PlanId::new("p1"),
                UserId::new("u1"),
                serde_json::json!({"pin": "d1"}),
                serde_json::json!({"diff": []}),
                baseline_hash(),
                Some(IdempotencyActionKey::new("k1")),
                now,
            )
            .unwrap();
        (tenant_id, id)
    }

    #[test]
    fn second_open_session_for_same_plan_conflicts() {
        let store = InMemoryStore::new();
        let engine = RepairSessionEngine::new(&store);
        let (tenant_id, _) = open_session(&engine, Timestamp::from_unix_seconds(0));
        let err = engine
            .create(
                RepairSessionId::new("r2"),
                tenant_id,
                PlanId::new("p1"),
                UserId::new("u1"),
                serde_json::json!({}),
                serde_json::json!({}),
                baseline_hash(),
                None,
                Timestamp::from_unix_seconds(1),
            )
            .unwrap_err();
        assert_eq!(err.code, "SESSION_ALREADY_EXISTS");
    }

    #[test]
    fn get_past_ttl_marks_expired() {
        let store = InMemoryStore::new();
        let engine = RepairSessionEngine::new(&store);
        let (tenant_id, id) = open_session(&engine, Timestamp::from_unix_seconds(0));
        let session = engine.get(&tenant_id, &id, Timestamp::from_unix_seconds(10_000)).unwrap();
        assert_eq!(session.status, RepairStatus::Expired);
    }

    #[test]
    fn apply_then_undo_restores_open_plan_state() {
        let store = InMemoryStore::new();
        let engine = RepairSessionEngine::new(&store);
        let (tenant_id, id) = open_session(&engine, Timestamp::from_unix_seconds(0));
        let applied = engine.apply(&tenant_id, &id, &baseline_hash(), Timestamp::from_unix_seconds(1)).unwrap();
        assert_eq!(applied.status, RepairStatus::Applied);
        assert_eq!(applied.undo_payload, Some(serde_json::json!({"diff": []})));
        let undone = engine.undo(&tenant_id, &id, Timestamp::from_unix_seconds(2)).unwrap();
        assert_eq!(undone.status, RepairStatus::Undone);
    }

    #[test]
    fn apply_with_drift_is_preview_stale() {
        let store = InMemoryStore::new();
        let engine = RepairSessionEngine::new(&store);
        let (tenant_id, id) = open_session(&engine, Timestamp::from_unix_seconds(0));
        let err = engine.apply(&tenant_id, &id, &drifted_hash(), Timestamp::from_unix_seconds(1)).unwrap_err();
        assert_eq!(err.code, "PREVIEW_STALE");
    }
}
