// solvereign-core/src/core/repair.rs
// ============================================================================
// Module: Solvereign Repair Session Model
// Description: Repair session state machine and its stored preview/undo payloads.
// Purpose: Canonical types underlying C6 (Repair Session Engine).
// Dependencies: serde, crate::core::{identifiers, idempotency, time}
// ============================================================================

//! ## Overview
//! A [`RepairSession`] coordinates an incremental, previewed modification to a
//! plan. At most one session may be `Open` per plan at any moment (enforced
//! by the store layer); `apply`/`undo` move it through the terminal states
//! documented on [`RepairStatus`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::IdempotencyActionKey;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::RepairSessionId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Repair Status
// ============================================================================

/// Repair session lifecycle status.
///
/// `Undone` is a distinct terminal variant from `Applied` (see DESIGN.md's
/// resolution of the UNDO open question): it restores the session's plan to
/// its pre-apply state in place rather than minting a new plan version,
/// since the plan being repaired never left `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    /// Awaiting apply or abort; at most one per plan.
    Open,
    /// Changes were persisted to the plan.
    Applied,
    /// Changes were rolled back after being applied.
    Undone,
    /// Discarded without ever applying.
    Aborted,
    /// Timed out before apply or abort.
    Expired,
}

impl RepairStatus {
    /// Returns whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

// ============================================================================
// SECTION: Repair Session
// ============================================================================

/// A server-authoritative workflow object coordinating incremental plan
/// modifications with preview, apply, and undo.
///
/// # Invariants
/// - At most one `Open` session per `plan_version_id`.
/// - `Applied`/`Undone`/`Aborted`/`Expired` never transition back to `Open`.
/// - `Open` sessions with `now >= expires_at` are treated as `Expired` on next access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSession {
    /// Session identifier.
    pub id: RepairSessionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Plan this session modifies.
    pub plan_version_id: PlanId,
    /// User who created the session. Apply/undo are not restricted to this
    /// user; authorization is by permission, not by possession of the id.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Expiry timestamp (`created_at + TTL`).
    pub expires_at: Timestamp,
    /// Current status.
    pub status: RepairStatus,
    /// Requested change payload supplied at creation.
    pub requested_changes: serde_json::Value,
    /// Computed preview diff, stored without touching the live plan.
    pub preview_payload: serde_json::Value,
    /// Hash of the plan's assignment matrix at preview time. `apply`
    /// recomputes this from the live plan and refuses with `PREVIEW_STALE`
    /// on mismatch, since the client cannot be trusted to report drift.
    pub baseline_assignments_hash: HashDigest,
    /// Inverse-edit payload captured at apply time, used by undo.
    pub undo_payload: Option<serde_json::Value>,
    /// Idempotency key supplied at creation, reused across apply/undo.
    pub idempotency_key: Option<IdempotencyActionKey>,
}

impl RepairSession {
    /// Returns whether this session is live (`Open` and not past its TTL) at
    /// `now`.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.status == RepairStatus::Open && now < self.expires_at
    }

    /// Returns whether this session should be observed as `Expired` at `now`,
    /// i.e. it is still recorded `Open` but has crossed its TTL.
    #[must_use]
    pub fn has_lapsed(&self, now: Timestamp) -> bool {
        self.status == RepairStatus::Open && now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::RepairStatus;

    #[test]
    fn open_is_not_terminal() {
        assert!(!RepairStatus::Open.is_terminal());
    }

    #[test]
    fn applied_undone_aborted_expired_are_terminal() {
        for status in [RepairStatus::Applied, RepairStatus::Undone, RepairStatus::Aborted, RepairStatus::Expired] {
            assert!(status.is_terminal());
        }
    }
}
