// solvereign-contract/src/schemas.rs
// ============================================================================
// Module: Contract Schemas
// Description: JSON schema builders for the HTTP request/response shapes.
// Purpose: Provide canonical validation schemas for docs, SDKs, and tests.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines JSON Schema payloads that mirror the request and
//! response bodies of every endpoint in [`crate::actions::actions`]. These
//! schemas are the single canonical source for docs and for
//! `solvereign-system-tests`'s response assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Shared Fragments
// ============================================================================

fn timestamp_schema() -> Value {
    json!({ "type": "string", "format": "date-time" })
}

fn uuid_schema(description: &str) -> Value {
    json!({ "type": "string", "format": "uuid", "description": description })
}

fn hash_digest_schema() -> Value {
    json!({
        "type": "object",
        "required": ["algorithm", "value"],
        "properties": {
            "algorithm": { "enum": ["sha256"] },
            "value": { "type": "string", "pattern": "^[0-9a-f]{64}$" }
        },
        "additionalProperties": false
    })
}

fn error_envelope_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error_code", "message", "trace_id"],
        "properties": {
            "error_code": { "type": "string" },
            "message": { "type": "string" },
            "trace_id": { "type": "string" }
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Request body for `POST /auth/login`.
#[must_use]
pub fn login_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["email", "password"],
        "properties": {
            "email": { "type": "string", "format": "email" },
            "password": { "type": "string", "minLength": 1 }
        },
        "additionalProperties": false
    })
}

/// Response body for `/auth/login` and `/auth/me`.
#[must_use]
pub fn session_schema() -> Value {
    json!({
        "type": "object",
        "required": ["user_id", "tenant_id", "roles", "expires_at"],
        "properties": {
            "user_id": uuid_schema("Authenticated user identifier."),
            "tenant_id": uuid_schema("Owning tenant, absent for platform-scope users."),
            "roles": { "type": "array", "items": { "type": "string" } },
            "expires_at": timestamp_schema()
        },
        "additionalProperties": false
    })
}

/// An empty success response body (logout, pin deletion).
#[must_use]
pub fn empty_response_schema() -> Value {
    json!({ "type": "object", "additionalProperties": false })
}

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Request body for `POST /plans`.
#[must_use]
pub fn plan_create_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["site_id", "planning_horizon_start", "planning_horizon_end"],
        "properties": {
            "site_id": uuid_schema("Owning site."),
            "planning_horizon_start": timestamp_schema(),
            "planning_horizon_end": timestamp_schema()
        },
        "additionalProperties": false
    })
}

/// A single plan resource.
#[must_use]
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "tenant_id", "site_id", "state", "created_at"],
        "properties": {
            "id": uuid_schema("Plan identifier."),
            "tenant_id": uuid_schema("Owning tenant."),
            "site_id": uuid_schema("Owning site."),
            "state": { "enum": ["draft", "solving", "solved", "failed", "published", "locked"] },
            "created_at": timestamp_schema(),
            "current_snapshot_id": uuid_schema("Most recent published snapshot, if any.")
        },
        "additionalProperties": false
    })
}

/// Response body for `GET /plans`.
#[must_use]
pub fn plan_list_schema() -> Value {
    json!({
        "type": "object",
        "required": ["plans"],
        "properties": { "plans": { "type": "array", "items": plan_schema() } },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Request body for `POST /snapshots/publish`.
#[must_use]
pub fn publish_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["plan_id", "reason"],
        "properties": {
            "plan_id": uuid_schema("Plan to publish."),
            "reason": { "type": "string", "minLength": 1 }
        },
        "additionalProperties": false
    })
}

/// A published snapshot resource.
#[must_use]
pub fn snapshot_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "plan_id", "status", "content_hash", "published_at"],
        "properties": {
            "id": uuid_schema("Snapshot identifier."),
            "plan_id": uuid_schema("Owning plan."),
            "status": { "enum": ["active", "superseded", "reverted"] },
            "content_hash": hash_digest_schema(),
            "published_at": timestamp_schema()
        },
        "additionalProperties": false
    })
}

/// Request body for `POST /plans/{id}/lock`.
#[must_use]
pub fn lock_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["confirm"],
        "properties": { "confirm": { "const": true } },
        "additionalProperties": false
    })
}

/// Response body for `GET /plans/{id}/matrix`.
#[must_use]
pub fn matrix_schema() -> Value {
    json!({
        "type": "object",
        "required": ["plan_id", "assignments"],
        "properties": {
            "plan_id": uuid_schema("Plan the matrix belongs to."),
            "assignments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["tour_id", "driver_id", "vehicle_id"],
                    "properties": {
                        "tour_id": uuid_schema("Tour identifier."),
                        "driver_id": uuid_schema("Assigned driver, if any."),
                        "vehicle_id": uuid_schema("Assigned vehicle, if any.")
                    },
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false
    })
}

/// Response body for `GET /plans/{id}/violations`.
#[must_use]
pub fn violations_schema() -> Value {
    json!({
        "type": "object",
        "required": ["violations"],
        "properties": {
            "violations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["rule_code", "severity", "message"],
                    "properties": {
                        "rule_code": { "type": "string" },
                        "severity": { "enum": ["BLOCK", "WARN"] },
                        "message": { "type": "string" }
                    },
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Pins
// ============================================================================

/// Request body for `POST /plans/{id}/pins`.
#[must_use]
pub fn pin_create_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["entity_type", "entity_id", "tour_id"],
        "properties": {
            "entity_type": { "enum": ["driver", "vehicle"] },
            "entity_id": uuid_schema("Pinned entity."),
            "tour_id": uuid_schema("Tour the entity is bound to.")
        },
        "additionalProperties": false
    })
}

/// A pin resource.
#[must_use]
pub fn pin_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "plan_id", "entity_type", "entity_id", "tour_id", "created_at"],
        "properties": {
            "id": uuid_schema("Pin identifier."),
            "plan_id": uuid_schema("Owning plan."),
            "entity_type": { "enum": ["driver", "vehicle"] },
            "entity_id": uuid_schema("Pinned entity."),
            "tour_id": uuid_schema("Tour the entity is bound to."),
            "created_at": timestamp_schema()
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Repair Sessions
// ============================================================================

/// Request body for `POST /repairs/sessions`.
#[must_use]
pub fn repair_create_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["plan_version_id"],
        "properties": { "plan_version_id": uuid_schema("Plan version to repair.") },
        "additionalProperties": false
    })
}

/// Request body for `POST /repairs/sessions/{sid}/apply`.
#[must_use]
pub fn repair_apply_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["changes"],
        "properties": {
            "changes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["tour_id"],
                    "properties": {
                        "tour_id": uuid_schema("Tour being reassigned."),
                        "driver_id": uuid_schema("New driver, if changed."),
                        "vehicle_id": uuid_schema("New vehicle, if changed.")
                    },
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false
    })
}

/// A repair session resource.
#[must_use]
pub fn repair_session_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "plan_version_id", "status", "expires_at"],
        "properties": {
            "id": uuid_schema("Repair session identifier."),
            "plan_version_id": uuid_schema("Plan version under repair."),
            "status": { "enum": ["open", "applied", "undone", "aborted", "expired"] },
            "expires_at": timestamp_schema()
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Evidence & Audit
// ============================================================================

/// Response body for `GET /evidence/{snapshot_id}`.
#[must_use]
pub fn evidence_pack_schema() -> Value {
    json!({
        "type": "object",
        "required": ["snapshot_id", "evidence_hash", "assignments_snapshot", "policy_profile"],
        "properties": {
            "snapshot_id": uuid_schema("Snapshot this pack proves."),
            "evidence_hash": hash_digest_schema(),
            "assignments_snapshot": { "type": "array", "items": { "type": "object" } },
            "policy_profile": { "type": "object" }
        },
        "additionalProperties": false
    })
}

/// Response body for `GET /audit`.
#[must_use]
pub fn audit_page_schema() -> Value {
    json!({
        "type": "object",
        "required": ["events", "next_cursor"],
        "properties": {
            "events": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "event_type", "occurred_at", "hash", "prev_hash"],
                    "properties": {
                        "id": uuid_schema("Audit event identifier."),
                        "event_type": { "type": "string" },
                        "occurred_at": timestamp_schema(),
                        "hash": hash_digest_schema(),
                        "prev_hash": hash_digest_schema()
                    },
                    "additionalProperties": false
                }
            },
            "next_cursor": { "oneOf": [{ "type": "null" }, { "type": "string" }] }
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Health
// ============================================================================

/// Response body for `/health` and `/health/ready`.
#[must_use]
pub fn health_schema() -> Value {
    json!({
        "type": "object",
        "required": ["status"],
        "properties": { "status": { "enum": ["ok", "degraded"] } },
        "additionalProperties": false
    })
}

/// Returns the shared error envelope schema, used to document every endpoint's
/// non-2xx responses.
#[must_use]
pub fn error_schema() -> Value {
    error_envelope_schema()
}
