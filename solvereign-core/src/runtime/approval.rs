// solvereign-core/src/runtime/approval.rs
// ============================================================================
// Module: Solvereign Approval Policy Engine
// Description: Orchestrates ApprovalRequest lifecycle against storage and the audit log.
// Purpose: Implements C8 (Approval Policy Engine) operations.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`ApprovalEngine`] wraps the pure [`ApprovalRequest`] state machine from
//! `crate::core::approval` with persistence and a hash-chained audit record
//! for every decision, matching the governance requirement that risk-bearing
//! overrides are always independently reconstructable from the audit log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ApiError;
use crate::core::ApprovalDecision;
use crate::core::ApprovalRequest;
use crate::core::ApprovalRequestId;
use crate::core::ApprovalStatus;
use crate::core::AuditEvent;
use crate::core::AuditEventId;
use crate::core::AuditSeverity;
use crate::core::DecisionVote;
use crate::core::RiskTier;
use crate::core::TenantId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::ApprovalRequestStore;
use crate::interfaces::AuditLogStore;

/// Orchestrates approval requests over stores implementing
/// [`ApprovalRequestStore`] and [`AuditLogStore`].
pub struct ApprovalEngine<'a, Store> {
    store: &'a Store,
}

impl<'a, Store: ApprovalRequestStore + AuditLogStore> ApprovalEngine<'a, Store> {
    /// Builds an engine over `store`.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// `request(action, entity, risk_tier)` (spec §4.8).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::internal` on store failure.
    pub fn request(
        &self,
        id: ApprovalRequestId,
        tenant_id: TenantId,
        action: impl Into<String>,
        entity: serde_json::Value,
        risk_tier: RiskTier,
        now: Timestamp,
    ) -> Result<ApprovalRequest, ApiError> {
        let action = action.into();
        let request = ApprovalRequest::open(id, tenant_id.clone(), action.clone(), entity.clone(), risk_tier, now);
        ApprovalRequestStore::create(self.store, &request).map_err(|err| ApiError::internal(&err.to_string()))?;
        self.append_audit(
            &tenant_id,
            "approval.requested",
            None,
            serde_json::json!({"request_id": request.id.as_str(), "action": action, "entity": entity, "risk_tier": risk_tier}),
            AuditSeverity::Info,
            now,
        )?;
        Ok(request)
    }

    /// `decide(request_id, approver, vote, reason)` (spec §4.8).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::not_found` if unknown, a state error when already
    /// terminal or the approver already voted, or `ApiError::internal` on
    /// store failure.
    pub fn decide(
        &self,
        tenant_id: &TenantId,
        request_id: &ApprovalRequestId,
        approver_id: UserId,
        vote: DecisionVote,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<ApprovalRequest, ApiError> {
        let mut request = ApprovalRequestStore::get(self.store, tenant_id, request_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .ok_or_else(|| ApiError::not_found("approval request"))?;
        let decision = ApprovalDecision {
            approver_id: approver_id.clone(),
            vote,
            reason: reason.into(),
            decided_at: now,
        };
        if !request.record_decision(decision) {
            return Err(ApiError::new(
                crate::core::ErrorKind::State,
                "DECISION_REJECTED",
                "request is no longer pending or this approver already voted",
            ));
        }
        ApprovalRequestStore::update(self.store, &request).map_err(|err| ApiError::internal(&err.to_string()))?;
        self.append_audit(
            tenant_id,
            "approval.decided",
            Some(approver_id),
            serde_json::json!({"request_id": request.id.as_str(), "vote": vote, "status": request.status}),
            AuditSeverity::Info,
            now,
        )?;
        Ok(request)
    }

    /// Bypasses the approval threshold and records a `HIGH`-severity audit
    /// event noting the mandatory 24h post-hoc review (spec §4.8).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::not_found` if unknown, a state error if not
    /// `Pending`, or `ApiError::internal` on store failure.
    pub fn emergency_override(
        &self,
        tenant_id: &TenantId,
        request_id: &ApprovalRequestId,
        actor: UserId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<ApprovalRequest, ApiError> {
        let mut request = ApprovalRequestStore::get(self.store, tenant_id, request_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .ok_or_else(|| ApiError::not_found("approval request"))?;
        if !request.emergency_override() {
            return Err(ApiError::new(
                crate::core::ErrorKind::State,
                "OVERRIDE_REJECTED",
                "request is not pending",
            ));
        }
        ApprovalRequestStore::update(self.store, &request).map_err(|err| ApiError::internal(&err.to_string()))?;
        self.append_audit(
            tenant_id,
            "approval.emergency_override",
            Some(actor),
            serde_json::json!({
                "request_id": request.id.as_str(),
                "reason": reason.into(),
                "review_due_hours": 24,
            }),
            AuditSeverity::High,
            now,
        )?;
        Ok(request)
    }

    /// Returns whether `request` has reached a state that permits the gated
    /// action to proceed (`Approved` or `Overridden`).
    #[must_use]
    pub fn permits_action(request: &ApprovalRequest) -> bool {
        matches!(request.status, ApprovalStatus::Approved | ApprovalStatus::Overridden)
    }

    fn append_audit(
        &self,
        tenant_id: &TenantId,
        action: &str,
        actor_user_id: Option<UserId>,
        payload: serde_json::Value,
        severity: AuditSeverity,
        now: Timestamp,
    ) -> Result<(), ApiError> {
        let prev_hash =
            AuditLogStore::latest_entry_hash(self.store, tenant_id).map_err(|err| ApiError::internal(&err.to_string()))?;
        let sequence = AuditLogStore::list(self.store, tenant_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .last()
            .map_or(1, |event| event.sequence + 1);
        let entry_hash = AuditEvent::compute_entry_hash(&prev_hash, action, &actor_user_id, &payload, severity, now)
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        let event = AuditEvent {
            id: AuditEventId::new(format!("{}-{sequence}", tenant_id.as_str())),
            tenant_id: tenant_id.clone(),
            sequence,
            action: action.to_string(),
            actor_user_id,
            payload,
            severity,
            prev_hash,
            entry_hash,
            occurred_at: now,
        };
        AuditLogStore::append(self.store, &event).map_err(|err| ApiError::internal(&err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ApprovalEngine;
    use crate::core::ApprovalRequestId;
    use crate::core::ApprovalStatus;
    use crate::core::DecisionVote;
    use crate::core::RiskTier;
    use crate::core::TenantId;
    use crate::core::Timestamp;
    use crate::core::UserId;
    use crate::interfaces::AuditLogStore;
    use crate::runtime::store::InMemoryStore;

    #[test]
    fn request_then_single_decision_completes_low_tier_and_audits_both() {
        let store = InMemoryStore::new();
        let engine = ApprovalEngine::new(&store);
        let tenant_id = TenantId::new("t1");
        let request = engine
            .request(
                ApprovalRequestId::new("a1"),
                tenant_id.clone(),
                "plan.publish",
                serde_json::json!({"plan_id": "p1"}),
                RiskTier::Low,
                Timestamp::from_unix_seconds(0),
            )
            .unwrap();
        let decided = engine
            .decide(
                &tenant_id,
                &request.id,
                UserId::new("u1"),
                DecisionVote::Approve,
                "looks fine",
                Timestamp::from_unix_seconds(1),
            )
            .unwrap();
        assert_eq!(decided.status, ApprovalStatus::Approved);
        assert!(ApprovalEngine::<InMemoryStore>::permits_action(&decided));
        let events = AuditLogStore::list(&store, &tenant_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "approval.requested");
        assert_eq!(events[1].action, "approval.decided");
    }

    #[test]
    fn emergency_override_records_high_severity_audit_entry() {
        let store = InMemoryStore::new();
        let engine = ApprovalEngine::new(&store);
        let tenant_id = TenantId::new("t1");
        let request = engine
            .request(
                ApprovalRequestId::new("a1"),
                tenant_id.clone(),
                "plan.publish",
                serde_json::json!({"plan_id": "p1"}),
                RiskTier::Critical,
                Timestamp::from_unix_seconds(0),
            )
            .unwrap();
        let overridden = engine
            .emergency_override(&tenant_id, &request.id, UserId::new("ops1"), "deadline in 20 minutes", Timestamp::from_unix_seconds(5))
            .unwrap();
        assert_eq!(overridden.status, ApprovalStatus::Overridden);
        let events = AuditLogStore::list(&store, &tenant_id).unwrap();
        assert_eq!(events[1].action, "approval.emergency_override");
        assert_eq!(events[1].severity, crate::core::AuditSeverity::High);
    }

    #[test]
    fn decide_on_unknown_request_is_not_found() {
        let store = InMemoryStore::new();
        let engine = ApprovalEngine::new(&store);
        let tenant_id = TenantId::new("t1");
        let err = engine
            .decide(
                &tenant_id,
                &ApprovalRequestId::new("missing"),
                UserId::new("u1"),
                DecisionVote::Approve,
                "ok",
                Timestamp::from_unix_seconds(0),
            )
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }
}
