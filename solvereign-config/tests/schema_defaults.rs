// solvereign-config/tests/schema_defaults.rs
// =============================================================================
// Module: Schema Defaults
// Description: Cross-checks schema defaults against SolvereignConfig defaults.
// Purpose: Prevent the schema and the struct defaults from drifting apart.
// =============================================================================

use solvereign_config::SolvereignConfig;
use solvereign_config::config_schema;

#[test]
fn schema_server_bind_default_matches_struct_default() {
    let schema = config_schema();
    let default = &schema["properties"]["server"]["properties"]["bind"]["default"];
    let config = SolvereignConfig::default();
    assert_eq!(default.as_str().unwrap(), config.server.bind);
}

#[test]
fn schema_session_ttl_default_matches_struct_default() {
    let schema = config_schema();
    let default = &schema["properties"]["session"]["properties"]["ttl_seconds"]["default"];
    let config = SolvereignConfig::default();
    assert_eq!(default.as_i64().unwrap(), config.session.ttl_seconds);
}

#[test]
fn schema_rejects_unknown_top_level_section() {
    use jsonschema::JSONSchema;
    let schema = config_schema();
    let compiled = JSONSchema::compile(&schema).unwrap();
    assert!(!compiled.is_valid(&serde_json::json!({ "providers": [] })));
}

#[test]
fn schema_accepts_full_example_payload() {
    use jsonschema::JSONSchema;
    let schema = config_schema();
    let compiled = JSONSchema::compile(&schema).unwrap();
    let payload = serde_json::json!({
        "server": { "bind": "0.0.0.0:9090", "max_body_bytes": 2048, "lock_timeout_ms": 5000 },
        "session": { "ttl_seconds": 3600, "cookie_prod_name": "a", "cookie_dev_name": "b" },
        "repair": { "ttl_seconds": 900 },
        "lifecycle": { "freeze_duration_hours": 6, "publish_reason_min_len": 20 },
        "idempotency": { "ttl_seconds": 1800 },
        "kill_switch": { "cache_ttl_seconds": 0 },
        "storage": {
            "path": "db.sqlite3",
            "busy_timeout_ms": 2000,
            "journal_mode": "wal",
            "sync_mode": "normal",
            "max_snapshot_versions": 10,
            "audit_retention_days": 30
        },
        "solver": { "mode": "http", "url": "https://solver.example.com" },
        "policy": {
            "profile_id": "p1",
            "rules": [
                { "code": "X", "severity": "BLOCK", "description": "d" }
            ]
        }
    });
    assert!(compiled.is_valid(&payload));
}
