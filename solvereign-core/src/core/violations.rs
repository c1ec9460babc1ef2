// solvereign-core/src/core/violations.rs
// ============================================================================
// Module: Solvereign Violations Model
// Description: Gate violation severities and the cached per-plan violation set.
// Purpose: Canonical types underlying C7 (Audit & Publish Gate).
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! Every gate evaluation produces a flat list of [`Violation`] rows scoped to
//! a [`Severity`]. [`ViolationsCache`] is the materialized, invalidate-on-write
//! result of the most recent evaluation for a plan; publish is refused while
//! any `Block`-severity violation remains outstanding (spec §4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PlanId;
use crate::core::identifiers::TenantId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Violation severity. `Block` refuses publish; `Warn` is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Refuses publish until resolved.
    Block,
    /// Surfaced to operators but does not refuse publish.
    Warn,
}

// ============================================================================
// SECTION: Violation
// ============================================================================

/// A single gate rule finding against a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable rule identifier (e.g. `"DRIVER_HOURS_EXCEEDED"`).
    pub rule_code: String,
    /// Severity of this finding.
    pub severity: Severity,
    /// Human-readable explanation.
    pub message: String,
    /// Structured reference to the offending entity (tour id, driver id, etc.).
    pub subject: serde_json::Value,
}

// ============================================================================
// SECTION: Violations Cache
// ============================================================================

/// Materialized result of the most recent gate evaluation for a plan.
///
/// # Invariants
/// - Replaced wholesale on every gate evaluation; never patched in place.
/// - `block_count`/`warn_count` always agree with `violations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationsCache {
    /// Owning plan version.
    pub plan_version_id: PlanId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Flat violation list from the most recent evaluation.
    pub violations: Vec<Violation>,
    /// Count of `Block`-severity entries in `violations`.
    pub block_count: u32,
    /// Count of `Warn`-severity entries in `violations`.
    pub warn_count: u32,
    /// Timestamp of the evaluation that produced this cache.
    pub evaluated_at: Timestamp,
}

impl ViolationsCache {
    /// Builds a cache from a freshly computed violation list, deriving the
    /// block/warn counts so they can never drift from the list itself.
    #[must_use]
    pub fn from_violations(
        plan_version_id: PlanId,
        tenant_id: TenantId,
        violations: Vec<Violation>,
        evaluated_at: Timestamp,
    ) -> Self {
        let block_count = violations.iter().filter(|v| v.severity == Severity::Block).count() as u32;
        let warn_count = violations.iter().filter(|v| v.severity == Severity::Warn).count() as u32;
        Self {
            plan_version_id,
            tenant_id,
            violations,
            block_count,
            warn_count,
            evaluated_at,
        }
    }

    /// Returns whether publish is blocked by this cache's contents.
    #[must_use]
    pub fn blocks_publish(&self) -> bool {
        self.block_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::Severity;
    use super::Violation;
    use super::ViolationsCache;
    use crate::core::identifiers::PlanId;
    use crate::core::identifiers::TenantId;
    use crate::core::time::Timestamp;

    fn sample_violation(severity: Severity) -> Violation {
        Violation {
            rule_code: "DRIVER_HOURS_EXCEEDED".to_string(),
            severity,
            message: "driver exceeds max hours".to_string(),
            subject: serde_json::json!({"driver_id": "d1"}),
        }
    }

    #[test]
    fn derives_counts_from_violation_list() {
        let cache = ViolationsCache::from_violations(
            PlanId::new("p1"),
            TenantId::new("t1"),
            vec![sample_violation(Severity::Block), sample_violation(Severity::Warn)],
            Timestamp::from_unix_seconds(0),
        );
        assert_eq!(cache.block_count, 1);
        assert_eq!(cache.warn_count, 1);
    }

    #[test]
    fn blocks_publish_only_when_block_count_positive() {
        let warn_only = ViolationsCache::from_violations(
            PlanId::new("p1"),
            TenantId::new("t1"),
            vec![sample_violation(Severity::Warn)],
            Timestamp::from_unix_seconds(0),
        );
        assert!(!warn_only.blocks_publish());

        let blocked = ViolationsCache::from_violations(
            PlanId::new("p1"),
            TenantId::new("t1"),
            vec![sample_violation(Severity::Block)],
            Timestamp::from_unix_seconds(0),
        );
        assert!(blocked.blocks_publish());
    }
}
