// solvereign-server/src/solve_cache.rs
// ============================================================================
// Module: Solve Output Cache
// Description: In-process cache of a plan's last solve inputs/assignments.
// Purpose: Bridge the gap between a solve call and a later publish call: the
//   governance core persists only content hashes on a PlanVersion, never the
//   raw assignment payload, so the HTTP layer holds the most recent solve's
//   payload in memory until it is either published (embedded durably into a
//   Snapshot) or the plan is re-solved.
// Dependencies: std::sync
// ============================================================================

//! ## Overview
//! [`SolveCache`] is deliberately NOT part of `solvereign-core`: it is an
//! HTTP-process-local convenience, not a governance record. A Solved plan
//! that has not yet been published loses its cached assignments if the
//! server restarts; the caller must re-run `POST /plans/{id}/solve` to
//! regenerate them. Once a plan is published, its assignments live durably
//! in the plan's `Snapshot` row and this cache is no longer consulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use solvereign_core::PlanId;
use solvereign_core::TenantId;

// ============================================================================
// SECTION: Cache Entry
// ============================================================================

/// A plan's most recent solve inputs and produced assignments.
#[derive(Debug, Clone)]
pub struct SolveRecord {
    /// Raw solve request payload, as submitted to `solve`.
    pub inputs: serde_json::Value,
    /// Canonical JSON of the produced assignments.
    pub assignments: serde_json::Value,
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Tenant-scoped cache keyed by plan id.
#[derive(Default)]
pub struct SolveCache {
    entries: Mutex<HashMap<(TenantId, PlanId), SolveRecord>>,
}

impl SolveCache {
    /// Builds an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the latest solve outcome for a plan, replacing any prior entry.
    pub fn put(&self, tenant_id: &TenantId, plan_id: &PlanId, record: SolveRecord) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((tenant_id.clone(), plan_id.clone()), record);
        }
    }

    /// Returns the cached record for a plan, if one has been solved since the
    /// last process start.
    #[must_use]
    pub fn get(&self, tenant_id: &TenantId, plan_id: &PlanId) -> Option<SolveRecord> {
        self.entries.lock().ok()?.get(&(tenant_id.clone(), plan_id.clone())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use solvereign_core::PlanId;
    use solvereign_core::TenantId;

    use super::SolveCache;
    use super::SolveRecord;

    #[test]
    fn put_then_get_round_trips() {
        let cache = SolveCache::new();
        let tenant_id = TenantId::new("t1");
        let plan_id = PlanId::new("p1");
        cache.put(
            &tenant_id,
            &plan_id,
            SolveRecord { inputs: serde_json::json!({"a": 1}), assignments: serde_json::json!({"b": 2}) },
        );
        let record = cache.get(&tenant_id, &plan_id).expect("entry present");
        assert_eq!(record.assignments, serde_json::json!({"b": 2}));
    }

    #[test]
    fn get_of_unknown_plan_is_none() {
        let cache = SolveCache::new();
        assert!(cache.get(&TenantId::new("t1"), &PlanId::new("missing")).is_none());
    }
}
