// solvereign-core/src/runtime/gate.rs
// ============================================================================
// Module: Solvereign Audit & Publish Gate
// Description: Plan constraint evaluation producing BLOCK/WARN violations.
// Purpose: Implements C7 (Audit & Publish Gate) operations.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The gate evaluates a plan's assignments against a fixed, named rule set.
//! Each rule independently inspects an [`AssignmentView`] slice and reports
//! zero or more [`Violation`]s. `compute_violations` runs every rule and
//! folds the results into a [`ViolationsCache`]; `check_publish_allowed`
//! reads that cache and enforces the BLOCK-count precondition from spec §4.7.
//!
//! The rule codes a given [`AssignmentView`] rule can produce are fixed by
//! this module, but whether a code actually surfaces as a violation, and at
//! what severity, is driven by the tenant's policy profile: `compute_violations`
//! takes a [`PolicyRule`] slice (see `solvereign_config::PolicyProfileConfig::gate_rules`)
//! and only reports violations whose code is present there, at the severity
//! that profile configures, so the evidence pack's embedded policy bytes
//! always match what actually ran.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::PlanId;
use crate::core::Severity;
use crate::core::TenantId;
use crate::core::Timestamp;
use crate::core::Violation;
use crate::core::ViolationsCache;

// ============================================================================
// SECTION: Assignment View
// ============================================================================

/// A single driver/tour assignment as seen by the gate. Intentionally the
/// minimal shape every rule needs; richer plan data lives in the solver's own
/// output representation and is projected down to this view before gate
/// evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentView {
    /// Driver identifier.
    pub driver_id: String,
    /// Tour identifier.
    pub tour_id: String,
    /// Assignment start, Unix seconds.
    pub start_seconds: i64,
    /// Assignment end, Unix seconds.
    pub end_seconds: i64,
    /// Minutes of rest since this driver's previous assignment, if any.
    pub rest_minutes_before: Option<i64>,
    /// Cumulative hours worked by this driver in the current week.
    pub weekly_hours: f64,
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

const MAX_REST_MINUTES_REQUIRED: i64 = 11 * 60;
const REST_WARN_MARGIN_MINUTES: i64 = 30;
const MAX_WEEKLY_HOURS: f64 = 48.0;
const WEEKLY_HOURS_WARN_MARGIN: f64 = 4.0;

/// Reports drivers double-booked on overlapping assignments. BLOCK.
fn rule_overlap(assignments: &[AssignmentView]) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            if a.driver_id == b.driver_id && a.start_seconds < b.end_seconds && b.start_seconds < a.end_seconds {
                out.push(Violation {
                    rule_code: "ASSIGNMENT_OVERLAP".to_string(),
                    severity: Severity::Block,
                    message: format!("driver {} has overlapping assignments {} and {}", a.driver_id, a.tour_id, b.tour_id),
                    subject: serde_json::json!({"driver_id": a.driver_id, "tour_ids": [a.tour_id, b.tour_id]}),
                });
            }
        }
    }
    out
}

/// Reports rest periods below the configured minimum. BLOCK when short of
/// the minimum, WARN when within the margin above it.
fn rule_rest_time(assignments: &[AssignmentView]) -> Vec<Violation> {
    let mut out = Vec::new();
    for a in assignments {
        let Some(rest) = a.rest_minutes_before else { continue };
        if rest < MAX_REST_MINUTES_REQUIRED {
            out.push(Violation {
                rule_code: "REST_TIME_VIOLATION".to_string(),
                severity: Severity::Block,
                message: format!("driver {} has only {rest} minutes rest before {}", a.driver_id, a.tour_id),
                subject: serde_json::json!({"driver_id": a.driver_id, "tour_id": a.tour_id, "rest_minutes": rest}),
            });
        } else if rest < MAX_REST_MINUTES_REQUIRED + REST_WARN_MARGIN_MINUTES {
            out.push(Violation {
                rule_code: "REST_TIME_MARGIN".to_string(),
                severity: Severity::Warn,
                message: format!("driver {} rest before {} is close to the minimum", a.driver_id, a.tour_id),
                subject: serde_json::json!({"driver_id": a.driver_id, "tour_id": a.tour_id, "rest_minutes": rest}),
            });
        }
    }
    out
}

/// Reports drivers over the configured maximum weekly hours. BLOCK over the
/// limit, WARN within the margin below it. Evaluated against each driver's
/// highest `weekly_hours` across all of their assignments, since that value
/// is cumulative and only the last assignment in a driver's schedule can
/// carry the violation.
fn rule_weekly_hours(assignments: &[AssignmentView]) -> Vec<Violation> {
    let mut peak_by_driver: std::collections::BTreeMap<&str, f64> = std::collections::BTreeMap::new();
    for a in assignments {
        let peak = peak_by_driver.entry(a.driver_id.as_str()).or_insert(a.weekly_hours);
        if a.weekly_hours > *peak {
            *peak = a.weekly_hours;
        }
    }

    let mut out = Vec::new();
    for (driver_id, weekly_hours) in peak_by_driver {
        if weekly_hours > MAX_WEEKLY_HOURS {
            out.push(Violation {
                rule_code: "DRIVER_HOURS_EXCEEDED".to_string(),
                severity: Severity::Block,
                message: format!("driver {driver_id} weekly hours {weekly_hours} exceed the maximum"),
                subject: serde_json::json!({"driver_id": driver_id, "weekly_hours": weekly_hours}),
            });
        } else if weekly_hours > MAX_WEEKLY_HOURS - WEEKLY_HOURS_WARN_MARGIN {
            out.push(Violation {
                rule_code: "DRIVER_HOURS_NEAR_LIMIT".to_string(),
                severity: Severity::Warn,
                message: format!("driver {driver_id} weekly hours {weekly_hours} are near the maximum"),
                subject: serde_json::json!({"driver_id": driver_id, "weekly_hours": weekly_hours}),
            });
        }
    }
    out
}

const RULES: &[fn(&[AssignmentView]) -> Vec<Violation>] = &[rule_overlap, rule_rest_time, rule_weekly_hours];

// ============================================================================
// SECTION: Policy Rules
// ============================================================================

/// A single rule code the gate is configured to enforce, and the severity it
/// should report at. This is `solvereign-core`'s own view of a policy
/// profile's rule table (this crate does not depend on `solvereign-config`);
/// `solvereign_config::PolicyProfileConfig::gate_rules` converts into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    /// Rule code, matching one of the codes a gate rule function can emit.
    pub code: String,
    /// Severity this profile assigns the rule.
    pub severity: Severity,
}

// ============================================================================
// SECTION: Gate Operations
// ============================================================================

/// Runs every rule in [`RULES`] against `assignments`, keeps only the
/// violations whose code appears in `rules`, overrides each kept violation's
/// severity to the one `rules` configures for its code, and folds the result
/// into a [`ViolationsCache`] (spec §4.7 `compute_violations`). A violation
/// whose code has no matching entry in `rules` is suppressed: the profile did
/// not enable that check.
#[must_use]
pub fn compute_violations(
    tenant_id: TenantId,
    plan_version_id: PlanId,
    assignments: &[AssignmentView],
    rules: &[PolicyRule],
    now: Timestamp,
) -> ViolationsCache {
    let violations = RULES
        .iter()
        .flat_map(|rule| rule(assignments))
        .filter_map(|violation| {
            rules.iter().find(|rule| rule.code == violation.rule_code).map(|rule| Violation { severity: rule.severity, ..violation })
        })
        .collect();
    ViolationsCache::from_violations(plan_version_id, tenant_id, violations, now)
}

/// Result of [`check_publish_allowed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishGateDecision {
    /// No BLOCK-severity violations outstanding.
    Allowed,
    /// At least one BLOCK-severity violation; publish must be refused.
    Refused {
        /// The BLOCK-severity violations driving the refusal, truncated to
        /// the first `limit` entries.
        details: Vec<Violation>,
    },
}

/// Reads `cache` and enforces the BLOCK-count precondition for publish
/// (spec §4.7). `limit` bounds how many violation details are surfaced.
#[must_use]
pub fn check_publish_allowed(cache: &ViolationsCache, limit: usize) -> PublishGateDecision {
    if !cache.blocks_publish() {
        return PublishGateDecision::Allowed;
    }
    let details = cache
        .violations
        .iter()
        .filter(|v| v.severity == Severity::Block)
        .take(limit)
        .cloned()
        .collect();
    PublishGateDecision::Refused { details }
}
