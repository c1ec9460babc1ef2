// solvereign-core/src/core/approval.rs
// ============================================================================
// Module: Solvereign Approval Policy Model
// Description: Risk tiers, approval requests, and decisions.
// Purpose: Canonical types underlying C8 (Approval Policy Engine).
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! An [`ApprovalRequest`] is opened against a computed [`RiskTier`] and
//! accumulates [`ApprovalDecision`] rows from distinct approvers until either
//! a `Reject` terminates it or enough `Approve` decisions reach
//! `required_approvals`. [`ApprovalRequest::emergency_override`] bypasses the
//! threshold but always forces a mandatory post-hoc review.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApprovalRequestId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Risk Tier
// ============================================================================

/// Computed risk tier, driving `required_approvals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// 1 approver required.
    Low,
    /// 1 approver required.
    Medium,
    /// 2 approvers required.
    High,
    /// 2 approvers required.
    Critical,
}

impl RiskTier {
    /// Returns the number of distinct approvals this tier requires.
    #[must_use]
    pub const fn required_approvals(self) -> u8 {
        match self {
            Self::Low | Self::Medium => 1,
            Self::High | Self::Critical => 2,
        }
    }
}

/// Inputs considered when computing a [`RiskTier`] for a requested action.
///
/// Kept as a plain context struct rather than folded into the risk function's
/// signature so new risk factors can be added without breaking call sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskContext {
    /// Number of drivers whose schedule the action affects.
    pub affected_driver_count: u32,
    /// Whether the action pushes any driver within the rest-time margin.
    pub near_rest_time_violation: bool,
    /// Whether the action falls within an active freeze window.
    pub within_freeze_period: bool,
    /// Hours remaining until the operational deadline the plan serves.
    pub hours_to_deadline: f64,
}

/// Computes a [`RiskTier`] from a [`RiskContext`] (spec §4.8).
#[must_use]
pub fn compute_risk_tier(ctx: RiskContext) -> RiskTier {
    if ctx.within_freeze_period || ctx.hours_to_deadline < 2.0 {
        return RiskTier::Critical;
    }
    if ctx.near_rest_time_violation || ctx.affected_driver_count >= 20 {
        return RiskTier::High;
    }
    if ctx.affected_driver_count >= 5 || ctx.hours_to_deadline < 12.0 {
        return RiskTier::Medium;
    }
    RiskTier::Low
}

// ============================================================================
// SECTION: Approval Decision
// ============================================================================

/// A single approver's vote on an [`ApprovalRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionVote {
    /// Counts toward `required_approvals`.
    Approve,
    /// Terminates the request immediately.
    Reject,
}

/// A recorded approver decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Deciding approver.
    pub approver_id: UserId,
    /// Vote cast.
    pub vote: DecisionVote,
    /// Approver-supplied reason.
    pub reason: String,
    /// Decision timestamp.
    pub decided_at: Timestamp,
}

// ============================================================================
// SECTION: Approval Request
// ============================================================================

/// Status of an [`ApprovalRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Accumulating decisions.
    Pending,
    /// Reached `required_approvals` with no rejection.
    Approved,
    /// Terminated by a `Reject` decision.
    Rejected,
    /// Bypassed via [`ApprovalRequest::emergency_override`].
    Overridden,
}

/// A request for approval of a risk-bearing action (e.g. publish during a
/// freeze window).
///
/// # Invariants
/// - `decisions` never contains two entries for the same `approver_id`.
/// - Once `status` leaves `Pending`, no further decisions are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Request identifier.
    pub id: ApprovalRequestId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Action this request gates (e.g. `"plan.publish"`).
    pub action: String,
    /// Structured reference to the entity under approval (plan id, etc.).
    pub entity: serde_json::Value,
    /// Computed risk tier at request time.
    pub risk_tier: RiskTier,
    /// Approvals required to reach `Approved`, fixed from `risk_tier` at creation.
    pub required_approvals: u8,
    /// Decisions recorded so far.
    pub decisions: Vec<ApprovalDecision>,
    /// Current status.
    pub status: ApprovalStatus,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl ApprovalRequest {
    /// Opens a new request with `required_approvals` derived from `risk_tier`.
    #[must_use]
    pub fn open(
        id: ApprovalRequestId,
        tenant_id: TenantId,
        action: impl Into<String>,
        entity: serde_json::Value,
        risk_tier: RiskTier,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            tenant_id,
            action: action.into(),
            entity,
            required_approvals: risk_tier.required_approvals(),
            risk_tier,
            decisions: Vec::new(),
            status: ApprovalStatus::Pending,
            created_at,
        }
    }

    /// Records `decision`, updating `status` accordingly.
    ///
    /// Returns `false` without recording anything when the request is no
    /// longer `Pending` or `approver_id` has already voted.
    pub fn record_decision(&mut self, decision: ApprovalDecision) -> bool {
        if self.status != ApprovalStatus::Pending {
            return false;
        }
        if self.decisions.iter().any(|d| d.approver_id == decision.approver_id) {
            return false;
        }
        let vote = decision.vote;
        self.decisions.push(decision);
        match vote {
            DecisionVote::Reject => self.status = ApprovalStatus::Rejected,
            DecisionVote::Approve => {
                let approvals = self
                    .decisions
                    .iter()
                    .filter(|d| d.vote == DecisionVote::Approve)
                    .count() as u8;
                if approvals >= self.required_approvals {
                    self.status = ApprovalStatus::Approved;
                }
            }
        }
        true
    }

    /// Bypasses the approval threshold. Returns `false` if the request is
    /// not `Pending`. Callers are responsible for writing the HIGH-severity
    /// audit event and scheduling the 24h mandatory review (spec §4.8).
    pub fn emergency_override(&mut self) -> bool {
        if self.status != ApprovalStatus::Pending {
            return false;
        }
        self.status = ApprovalStatus::Overridden;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::ApprovalDecision;
    use super::ApprovalRequest;
    use super::ApprovalStatus;
    use super::DecisionVote;
    use super::RiskContext;
    use super::RiskTier;
    use super::compute_risk_tier;
    use crate::core::identifiers::ApprovalRequestId;
    use crate::core::identifiers::TenantId;
    use crate::core::identifiers::UserId;
    use crate::core::time::Timestamp;

    fn base_ctx() -> RiskContext {
        RiskContext {
            affected_driver_count: 1,
            near_rest_time_violation: false,
            within_freeze_period: false,
            hours_to_deadline: 48.0,
        }
    }

    #[test]
    fn freeze_period_forces_critical() {
        let ctx = RiskContext { within_freeze_period: true, ..base_ctx() };
        assert_eq!(compute_risk_tier(ctx), RiskTier::Critical);
        assert_eq!(RiskTier::Critical.required_approvals(), 2);
    }

    #[test]
    fn low_risk_default_context() {
        assert_eq!(compute_risk_tier(base_ctx()), RiskTier::Low);
    }

    #[test]
    fn single_approval_completes_low_tier_request() {
        let mut req = ApprovalRequest::open(
            ApprovalRequestId::new("r1"),
            TenantId::new("t1"),
            "plan.publish",
            serde_json::json!({"plan_id": "p1"}),
            RiskTier::Low,
            Timestamp::from_unix_seconds(0),
        );
        let recorded = req.record_decision(ApprovalDecision {
            approver_id: UserId::new("u1"),
            vote: DecisionVote::Approve,
            reason: "looks fine".to_string(),
            decided_at: Timestamp::from_unix_seconds(1),
        });
        assert!(recorded);
        assert_eq!(req.status, ApprovalStatus::Approved);
    }

    #[test]
    fn reject_is_terminal_even_with_required_approvals_outstanding() {
        let mut req = ApprovalRequest::open(
            ApprovalRequestId::new("r1"),
            TenantId::new("t1"),
            "plan.publish",
            serde_json::json!({"plan_id": "p1"}),
            RiskTier::High,
            Timestamp::from_unix_seconds(0),
        );
        req.record_decision(ApprovalDecision {
            approver_id: UserId::new("u1"),
            vote: DecisionVote::Reject,
            reason: "blocked driver conflicts".to_string(),
            decided_at: Timestamp::from_unix_seconds(1),
        });
        assert_eq!(req.status, ApprovalStatus::Rejected);
        let second = req.record_decision(ApprovalDecision {
            approver_id: UserId::new("u2"),
            vote: DecisionVote::Approve,
            reason: "too late".to_string(),
            decided_at: Timestamp::from_unix_seconds(2),
        });
        assert!(!second);
    }

    #[test]
    fn same_approver_cannot_vote_twice() {
        let mut req = ApprovalRequest::open(
            ApprovalRequestId::new("r1"),
            TenantId::new("t1"),
            "plan.publish",
            serde_json::json!({"plan_id": "p1"}),
            RiskTier::High,
            Timestamp::from_unix_seconds(0),
        );
        let approver = UserId::new("u1");
        req.record_decision(ApprovalDecision {
            approver_id: approver.clone(),
            vote: DecisionVote::Approve,
            reason: "ok".to_string(),
            decided_at: Timestamp::from_unix_seconds(1),
        });
        let replay = req.record_decision(ApprovalDecision {
            approver_id: approver,
            vote: DecisionVote::Approve,
            reason: "ok again".to_string(),
            decided_at: Timestamp::from_unix_seconds(2),
        });
        assert!(!replay);
        assert_eq!(req.status, ApprovalStatus::Pending);
    }

    #[test]
    fn emergency_override_bypasses_pending_threshold() {
        let mut req = ApprovalRequest::open(
            ApprovalRequestId::new("r1"),
            TenantId::new("t1"),
            "plan.publish",
            serde_json::json!({"plan_id": "p1"}),
            RiskTier::Critical,
            Timestamp::from_unix_seconds(0),
        );
        assert!(req.emergency_override());
        assert_eq!(req.status, ApprovalStatus::Overridden);
        assert!(!req.emergency_override());
    }
}
