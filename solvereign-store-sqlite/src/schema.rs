// solvereign-store-sqlite/src/schema.rs
// ============================================================================
// Module: SQLite Schema Initialization
// Description: Table, index, and trigger definitions for every aggregate.
// Purpose: Single source of truth for the on-disk schema and its version.
// Dependencies: rusqlite, solvereign-store-sqlite::config
// ============================================================================

//! ## Overview
//! The schema is versioned through a single-row `store_meta` table, checked
//! on every open. A fresh database is created at [`SCHEMA_VERSION`]; an
//! existing database at a stale version is rejected rather than silently
//! migrated, since no prior schema version has shipped yet. The scaffold
//! mirrors the version-check-then-migrate shape so a future bump has a place
//! to add an `ALTER TABLE` branch.
//!
//! Two invariants are enforced at the SQL layer rather than left to callers:
//! `audit_log` rejects `UPDATE`/`DELETE` outright, and `snapshots` rejects
//! any `UPDATE` that touches a column other than `snapshot_status`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::config::SCHEMA_VERSION;
use crate::config::SqliteStoreError;
use crate::config::map_sqlite_error;

// ============================================================================
// SECTION: Schema DDL
// ============================================================================

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tenants (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    site_code TEXT NOT NULL,
    name TEXT NOT NULL,
    publish_enabled INTEGER NOT NULL,
    UNIQUE (tenant_id, site_code)
);
CREATE INDEX IF NOT EXISTS idx_sites_tenant ON sites (tenant_id);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    tenant_id TEXT REFERENCES tenants(id),
    is_platform INTEGER NOT NULL,
    roles_json TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    session_hash TEXT NOT NULL UNIQUE,
    tenant_id TEXT,
    site_id TEXT,
    is_platform_scope INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    revoked_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions (user_id);

CREATE TABLE IF NOT EXISTS external_mappings (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    external_system TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    external_id TEXT NOT NULL,
    internal_id TEXT NOT NULL,
    sync_status TEXT NOT NULL,
    UNIQUE (tenant_id, external_system, entity_type, external_id)
);

CREATE TABLE IF NOT EXISTS plan_versions (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    site_id TEXT NOT NULL REFERENCES sites(id),
    forecast_version_id TEXT NOT NULL,
    state TEXT NOT NULL,
    seed INTEGER NOT NULL,
    input_hash_algorithm TEXT,
    input_hash_value TEXT,
    output_hash_algorithm TEXT,
    output_hash_value TEXT,
    block_count INTEGER NOT NULL,
    warn_count INTEGER NOT NULL,
    current_snapshot_id TEXT,
    publish_count INTEGER NOT NULL,
    freeze_until INTEGER,
    repair_source_snapshot_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plan_versions_tenant ON plan_versions (tenant_id);

CREATE TABLE IF NOT EXISTS snapshots (
    id TEXT PRIMARY KEY,
    plan_version_id TEXT NOT NULL REFERENCES plan_versions(id),
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    version_number INTEGER NOT NULL,
    published_at INTEGER NOT NULL,
    published_by TEXT NOT NULL,
    publish_reason TEXT NOT NULL,
    freeze_until INTEGER NOT NULL,
    input_hash_algorithm TEXT NOT NULL,
    input_hash_value TEXT NOT NULL,
    matrix_hash_algorithm TEXT NOT NULL,
    matrix_hash_value TEXT NOT NULL,
    output_hash_algorithm TEXT NOT NULL,
    output_hash_value TEXT NOT NULL,
    evidence_hash_algorithm TEXT NOT NULL,
    evidence_hash_value TEXT NOT NULL,
    assignments_snapshot TEXT NOT NULL,
    audit_results_snapshot TEXT NOT NULL,
    snapshot_status TEXT NOT NULL,
    UNIQUE (plan_version_id, version_number)
);
CREATE INDEX IF NOT EXISTS idx_snapshots_plan ON snapshots (tenant_id, plan_version_id);

CREATE TRIGGER IF NOT EXISTS snapshots_immutable
BEFORE UPDATE ON snapshots
WHEN
    OLD.plan_version_id IS NOT NEW.plan_version_id OR
    OLD.tenant_id IS NOT NEW.tenant_id OR
    OLD.version_number IS NOT NEW.version_number OR
    OLD.published_at IS NOT NEW.published_at OR
    OLD.published_by IS NOT NEW.published_by OR
    OLD.publish_reason IS NOT NEW.publish_reason OR
    OLD.freeze_until IS NOT NEW.freeze_until OR
    OLD.input_hash_value IS NOT NEW.input_hash_value OR
    OLD.matrix_hash_value IS NOT NEW.matrix_hash_value OR
    OLD.output_hash_value IS NOT NEW.output_hash_value OR
    OLD.evidence_hash_value IS NOT NEW.evidence_hash_value OR
    OLD.assignments_snapshot IS NOT NEW.assignments_snapshot OR
    OLD.audit_results_snapshot IS NOT NEW.audit_results_snapshot
BEGIN
    SELECT RAISE(ABORT, 'snapshot fields other than snapshot_status are immutable');
END;

CREATE TABLE IF NOT EXISTS pins (
    id TEXT PRIMARY KEY,
    plan_version_id TEXT NOT NULL REFERENCES plan_versions(id),
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    pin_key TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (plan_version_id, pin_key)
);

CREATE TABLE IF NOT EXISTS repair_sessions (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    plan_version_id TEXT NOT NULL REFERENCES plan_versions(id),
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    status TEXT NOT NULL,
    requested_changes TEXT NOT NULL,
    preview_payload TEXT NOT NULL,
    baseline_assignments_hash_algorithm TEXT NOT NULL DEFAULT 'sha256',
    baseline_assignments_hash_value TEXT NOT NULL DEFAULT '',
    undo_payload TEXT,
    idempotency_key TEXT
);
CREATE INDEX IF NOT EXISTS idx_repair_sessions_plan ON repair_sessions (tenant_id, plan_version_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_repair_sessions_open ON repair_sessions (tenant_id, plan_version_id) WHERE status = 'OPEN';

CREATE TABLE IF NOT EXISTS violations_cache (
    plan_version_id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    violations TEXT NOT NULL,
    block_count INTEGER NOT NULL,
    warn_count INTEGER NOT NULL,
    evaluated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS approval_requests (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    action TEXT NOT NULL,
    entity TEXT NOT NULL,
    risk_tier TEXT NOT NULL,
    required_approvals INTEGER NOT NULL,
    decisions TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_log (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    sequence INTEGER NOT NULL,
    action TEXT NOT NULL,
    actor_user_id TEXT,
    payload TEXT NOT NULL,
    severity TEXT NOT NULL DEFAULT 'INFO',
    prev_hash_algorithm TEXT NOT NULL,
    prev_hash_value TEXT NOT NULL,
    entry_hash_algorithm TEXT NOT NULL,
    entry_hash_value TEXT NOT NULL,
    occurred_at INTEGER NOT NULL,
    UNIQUE (tenant_id, sequence)
);

CREATE TRIGGER IF NOT EXISTS audit_log_no_update
BEFORE UPDATE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit_log is append-only');
END;

CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
BEFORE DELETE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit_log is append-only');
END;

CREATE TABLE IF NOT EXISTS idempotency_records (
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    action_key TEXT NOT NULL,
    request_hash_algorithm TEXT NOT NULL,
    request_hash_value TEXT NOT NULL,
    response_snapshot TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (tenant_id, action_key)
);

CREATE TABLE IF NOT EXISTS advisory_locks (
    plan_version_id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    holder_token TEXT NOT NULL,
    acquired_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS kill_switches (
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    site_id TEXT NOT NULL,
    capability TEXT NOT NULL,
    enabled INTEGER NOT NULL,
    PRIMARY KEY (tenant_id, site_id, capability)
);
";

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Initializes the `SQLite` schema or validates an existing database's version.
pub(crate) fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(map_sqlite_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);").map_err(map_sqlite_error)?;
    let version: Option<i64> =
        tx.query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0)).optional().map_err(map_sqlite_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION]).map_err(map_sqlite_error)?;
            tx.execute_batch(CREATE_SCHEMA).map_err(map_sqlite_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!("unsupported schema version: {value}")));
        }
    }
    tx.commit().map_err(map_sqlite_error)
}
