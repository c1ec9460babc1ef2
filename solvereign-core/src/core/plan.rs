// solvereign-core/src/core/plan.rs
// ============================================================================
// Module: Solvereign Plan Lifecycle Model
// Description: PlanVersion, its state machine, immutable Snapshots, and Pins.
// Purpose: Canonical types underlying C5 (Plan Lifecycle Manager).
// Dependencies: serde, crate::core::{identifiers, hashing, time}
// ============================================================================

//! ## Overview
//! A [`PlanVersion`] progresses through [`PlanState`] following the machine
//! documented on the type itself. [`Snapshot`] rows are immutable once
//! created except for [`SnapshotStatus`] transitions; all other fields are
//! write-once. [`Pin`] is an operator-declared constraint bound to a plan.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::ForecastVersionId;
use crate::core::identifiers::PinId;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::SiteId;
use crate::core::identifiers::SnapshotId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Plan State
// ============================================================================

/// Plan lifecycle state.
///
/// # State machine
/// ```text
/// DRAFT --solve--> SOLVING --ok--> SOLVED --approve+publish--> PUBLISHED --lock--> LOCKED
///               |          --err-> FAILED                                    (terminal)
/// SOLVED --repair--> (new DRAFT PlanVersion rooted from snapshot)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanState {
    /// Newly created, not yet solved.
    Draft,
    /// Solve in progress.
    Solving,
    /// Solve completed successfully.
    Solved,
    /// Solve completed with a failure.
    Failed,
    /// Published via an immutable snapshot.
    Published,
    /// Terminal, irreversible state.
    Locked,
}

impl PlanState {
    /// Returns whether a transition from `self` to `next` is permitted by
    /// the lifecycle state machine.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Solving)
                | (Self::Solving, Self::Solved)
                | (Self::Solving, Self::Failed)
                | (Self::Solved, Self::Published)
                | (Self::Published, Self::Locked)
        )
    }

    /// Returns whether the plan accepts any further mutation.
    #[must_use]
    pub const fn is_mutable(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

// ============================================================================
// SECTION: Plan Version
// ============================================================================

/// A tenant-owned scheduling artifact progressing through [`PlanState`].
///
/// # Invariants
/// - State transitions follow [`PlanState::can_transition_to`].
/// - Once `Locked`, all mutation is refused.
/// - `output_hash` is stable once the plan reaches `Solved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanVersion {
    /// Plan identifier.
    pub id: PlanId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning site.
    pub site_id: SiteId,
    /// Upstream forecast this plan was drafted against.
    pub forecast_version_id: ForecastVersionId,
    /// Current lifecycle state.
    pub state: PlanState,
    /// Solver seed, fixed at draft creation.
    pub seed: u64,
    /// Canonical hash of solve inputs, set at draft creation.
    pub input_hash: Option<HashDigest>,
    /// Canonical hash of solve outputs, set once `Solved`.
    pub output_hash: Option<HashDigest>,
    /// BLOCK violation count as of the last gate evaluation.
    pub block_count: u32,
    /// WARN violation count as of the last gate evaluation.
    pub warn_count: u32,
    /// Active snapshot for this plan, if published.
    pub current_snapshot_id: Option<SnapshotId>,
    /// Number of times this plan has been published.
    pub publish_count: u32,
    /// Freeze window end, set on publish.
    pub freeze_until: Option<Timestamp>,
    /// Snapshot this plan was repaired from, if any.
    pub repair_source_snapshot_id: Option<SnapshotId>,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl PlanVersion {
    /// Returns whether `now` falls within this plan's freeze window.
    #[must_use]
    pub fn is_frozen(&self, now: Timestamp) -> bool {
        self.freeze_until.is_some_and(|until| now < until)
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Snapshot lifecycle status. May only move forward: `Active` → `Superseded`
/// → `Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotStatus {
    /// Current authoritative snapshot for its plan.
    Active,
    /// Superseded by a later snapshot.
    Superseded,
    /// Retained for retention only.
    Archived,
}

impl SnapshotStatus {
    /// Returns whether a transition from `self` to `next` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Active, Self::Superseded) | (Self::Superseded, Self::Archived))
    }
}

/// Immutable record materialized at publish time.
///
/// # Invariants
/// - Append-only: all fields except `snapshot_status` never change after creation.
/// - `version_number` is `prev_max + 1` within its `plan_version_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot identifier.
    pub id: SnapshotId,
    /// Owning plan version.
    pub plan_version_id: PlanId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Monotonic version number within the plan.
    pub version_number: u32,
    /// Publish timestamp.
    pub published_at: Timestamp,
    /// Approver who published.
    pub published_by: UserId,
    /// Operator-supplied publish reason (validated against the configured minimum length).
    pub publish_reason: String,
    /// Freeze window end for this snapshot.
    pub freeze_until: Timestamp,
    /// Input hash at publish time.
    pub input_hash: HashDigest,
    /// Derived-matrix hash at publish time.
    pub matrix_hash: HashDigest,
    /// Output hash at publish time.
    pub output_hash: HashDigest,
    /// Evidence pack hash (`H(canonical(pack))`).
    pub evidence_hash: HashDigest,
    /// Canonical JSON of the assignments at publish time.
    pub assignments_snapshot: serde_json::Value,
    /// Canonical JSON of the audit/violation results at publish time.
    pub audit_results_snapshot: serde_json::Value,
    /// Lifecycle status.
    pub snapshot_status: SnapshotStatus,
}

// ============================================================================
// SECTION: Pin
// ============================================================================

/// Operator-declared constraint bound to a plan (e.g. "driver D on tour T").
///
/// # Invariants
/// - Unique within its plan for `pin_key`.
/// - Creation/deletion forbidden once the plan is `Locked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin identifier.
    pub id: PinId,
    /// Owning plan version.
    pub plan_version_id: PlanId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Stable key distinguishing this pin from others of the same plan (e.g. `"driver:D42"`).
    pub pin_key: String,
    /// Structured pin payload (entity references, constraint parameters).
    pub payload: serde_json::Value,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::PlanState;
    use super::SnapshotStatus;

    #[test]
    fn draft_can_only_advance_to_solving() {
        assert!(PlanState::Draft.can_transition_to(PlanState::Solving));
        assert!(!PlanState::Draft.can_transition_to(PlanState::Published));
    }

    #[test]
    fn locked_is_terminal() {
        assert!(!PlanState::Locked.can_transition_to(PlanState::Draft));
        assert!(!PlanState::Locked.is_mutable());
    }

    #[test]
    fn solving_branches_to_solved_or_failed() {
        assert!(PlanState::Solving.can_transition_to(PlanState::Solved));
        assert!(PlanState::Solving.can_transition_to(PlanState::Failed));
    }

    #[test]
    fn snapshot_status_only_moves_forward() {
        assert!(SnapshotStatus::Active.can_transition_to(SnapshotStatus::Superseded));
        assert!(!SnapshotStatus::Superseded.can_transition_to(SnapshotStatus::Active));
        assert!(!SnapshotStatus::Archived.can_transition_to(SnapshotStatus::Active));
    }
}
