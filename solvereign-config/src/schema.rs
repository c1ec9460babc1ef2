// solvereign-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema builder for solvereign.toml.
// Purpose: Provide a canonical, machine-checkable validation schema.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The JSON Schema is generated from the canonical config model (this
//! module's functions mirror [`crate::config`]'s struct fields one-to-one)
//! and is used by the docs generator and by `solvereign-cli validate-config`.

use serde_json::Value;
use serde_json::json;

use crate::config::default_bind_addr;
use crate::config::default_freeze_duration_hours;
use crate::config::default_idempotency_ttl_seconds;
use crate::config::default_kill_switch_cache_ttl_seconds;
use crate::config::default_lock_timeout_ms;
use crate::config::default_max_body_bytes;
use crate::config::default_publish_reason_min_len;
use crate::config::default_repair_ttl_seconds;
use crate::config::default_session_ttl_seconds;
use crate::config::default_store_busy_timeout_ms;

/// Returns the JSON schema for `solvereign.toml`.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "solvereign://contract/schemas/config.schema.json",
        "title": "Solvereign Configuration",
        "description": "Configuration for the Solvereign governance engine.",
        "type": "object",
        "properties": {
            "server": server_config_schema(),
            "session": session_config_schema(),
            "repair": repair_config_schema(),
            "lifecycle": lifecycle_config_schema(),
            "idempotency": idempotency_config_schema(),
            "kill_switch": kill_switch_config_schema(),
            "storage": storage_config_schema(),
            "solver": solver_config_schema(),
            "policy": policy_config_schema(),
        },
        "additionalProperties": false
    })
}

/// Schema for the `[server]` section.
fn server_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "bind": { "type": "string", "default": default_bind_addr() },
            "max_body_bytes": {
                "type": "integer",
                "minimum": 1,
                "default": default_max_body_bytes()
            },
            "lock_timeout_ms": {
                "type": "integer",
                "minimum": 1,
                "default": default_lock_timeout_ms()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[session]` section.
fn session_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ttl_seconds": {
                "type": "integer",
                "minimum": 1,
                "default": default_session_ttl_seconds()
            },
            "cookie_prod_name": { "type": "string" },
            "cookie_dev_name": { "type": "string" }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[repair]` section.
fn repair_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ttl_seconds": {
                "type": "integer",
                "minimum": 1,
                "default": default_repair_ttl_seconds()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[lifecycle]` section.
fn lifecycle_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "freeze_duration_hours": {
                "type": "integer",
                "minimum": 1,
                "default": default_freeze_duration_hours()
            },
            "publish_reason_min_len": {
                "type": "integer",
                "minimum": 1,
                "default": default_publish_reason_min_len()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[idempotency]` section.
fn idempotency_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ttl_seconds": {
                "type": "integer",
                "minimum": 1,
                "default": default_idempotency_ttl_seconds()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[kill_switch]` section.
fn kill_switch_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "cache_ttl_seconds": {
                "type": "integer",
                "minimum": 0,
                "default": default_kill_switch_cache_ttl_seconds()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[storage]` section.
fn storage_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": { "type": "string" },
            "busy_timeout_ms": {
                "type": "integer",
                "minimum": 1,
                "default": default_store_busy_timeout_ms()
            },
            "journal_mode": { "enum": ["wal", "delete"], "default": "wal" },
            "sync_mode": { "enum": ["full", "normal"], "default": "full" },
            "max_snapshot_versions": {
                "oneOf": [{ "type": "null" }, { "type": "integer", "minimum": 1 }],
                "default": null
            },
            "audit_retention_days": {
                "oneOf": [{ "type": "null" }, { "type": "integer", "minimum": 1 }],
                "default": null
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[solver]` section.
fn solver_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "mode": { "enum": ["deterministic", "http"], "default": "deterministic" },
            "url": {
                "oneOf": [{ "type": "null" }, { "type": "string" }],
                "default": null
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for the `[policy]` section.
fn policy_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "profile_id": { "type": "string", "default": "default" },
            "rules": {
                "type": "array",
                "items": policy_rule_schema()
            }
        },
        "additionalProperties": false,
        "default": {}
    })
}

/// Schema for a single `[[policy.rules]]` entry.
fn policy_rule_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": { "type": "string", "pattern": "^[A-Z][A-Z0-9_]*$" },
            "severity": { "enum": ["BLOCK", "WARN"] },
            "description": { "type": "string" }
        },
        "required": ["code", "severity", "description"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use jsonschema::JSONSchema;

    use super::config_schema;

    #[test]
    fn config_schema_validates_against_json_schema_itself() {
        let schema = config_schema();
        let compiled = JSONSchema::compile(&schema).unwrap();
        assert!(compiled.is_valid(&serde_json::json!({})));
    }

    #[test]
    fn bogus_top_level_key_is_rejected() {
        let schema = config_schema();
        let compiled = JSONSchema::compile(&schema).unwrap();
        assert!(!compiled.is_valid(&serde_json::json!({"not_a_real_section": {}})));
    }
}
