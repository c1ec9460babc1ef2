// solvereign-contract/src/examples.rs
// ============================================================================
// Module: Contract Examples
// Description: Canonical example payloads for the API action catalog.
// Purpose: Provide deterministic, real-world examples for docs.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Example request/response payloads, one per representative action, used to
//! populate the generated docs bundle. These are illustrative JSON values,
//! not validated round-trips against the live server.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

/// Example `POST /plans` request body.
#[must_use]
pub fn plan_create_example() -> Value {
    json!({
        "site_id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a10",
        "planning_horizon_start": "2026-08-01T00:00:00Z",
        "planning_horizon_end": "2026-08-02T00:00:00Z"
    })
}

/// Example `POST /snapshots/publish` request body.
#[must_use]
pub fn publish_request_example() -> Value {
    json!({
        "plan_id": "7c1e8c2a-6b3d-4e9a-8f0b-2d4a5b6c7d8e",
        "reason": "Manual publish after driver rest-window override review."
    })
}

/// Example `GET /plans/{id}/violations` response body.
#[must_use]
pub fn violations_example() -> Value {
    json!({
        "violations": [
            {
                "rule_code": "REST_TIME_MARGIN",
                "severity": "WARN",
                "message": "Driver 9c2f rest before the next tour is close to the minimum."
            }
        ]
    })
}

/// Example `GET /evidence/{snapshot_id}` response body.
#[must_use]
pub fn evidence_pack_example() -> Value {
    json!({
        "snapshot_id": "a5d1f7e2-3c4b-4d5e-9f0a-1b2c3d4e5f60",
        "evidence_hash": {
            "algorithm": "sha256",
            "value": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        },
        "assignments_snapshot": [],
        "policy_profile": { "profile_id": "default", "rules": [] }
    })
}
