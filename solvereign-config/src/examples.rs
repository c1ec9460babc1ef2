// solvereign-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for Solvereign configuration. Outputs are
//! deterministic and kept in sync with schema and docs.

/// Returns a canonical example `solvereign.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 1048576
lock_timeout_ms = 10000

[session]
ttl_seconds = 28800
cookie_prod_name = "__Host-solvereign-session"
cookie_dev_name = "solvereign-session"

[repair]
ttl_seconds = 1800

[lifecycle]
freeze_duration_hours = 12
publish_reason_min_len = 10

[idempotency]
ttl_seconds = 3600

[kill_switch]
cache_ttl_seconds = 5

[storage]
path = "solvereign.sqlite3"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"
# max_snapshot_versions = 50
# audit_retention_days = 365

[solver]
mode = "deterministic"
# url = "https://solver.example.com"

[policy]
profile_id = "default"

[[policy.rules]]
code = "ASSIGNMENT_OVERLAP"
severity = "BLOCK"
description = "A driver is assigned to two overlapping tours."

[[policy.rules]]
code = "REST_TIME_VIOLATION"
severity = "BLOCK"
description = "A driver's rest before a tour is shorter than the required minimum."

[[policy.rules]]
code = "REST_TIME_MARGIN"
severity = "WARN"
description = "A driver's rest before a tour is close to the required minimum."

[[policy.rules]]
code = "DRIVER_HOURS_EXCEEDED"
severity = "BLOCK"
description = "A driver's weekly hours exceed the configured maximum."

[[policy.rules]]
code = "DRIVER_HOURS_NEAR_LIMIT"
severity = "WARN"
description = "A driver's weekly hours are near the configured maximum."
"#,
    )
}
