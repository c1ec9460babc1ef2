// solvereign-store-sqlite/src/audit.rs
// ============================================================================
// Module: Audit Log Store
// Description: SQLite-backed AuditLogStore.
// Purpose: Implement C10's append-only, hash-chained audit log persistence.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

//! ## Overview
//! `append` checks the tenant's current max `sequence` inside a transaction
//! before inserting, rejecting out-of-order appends with
//! [`solvereign_core::StoreError::Conflict`] before they ever reach the
//! `audit_log` table's append-only triggers. `latest_entry_hash` returns
//! [`GENESIS_HASH`] for a tenant with no rows yet, matching the chain's
//! starting point.

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::AuditEvent;
use solvereign_core::AuditEventId;
use solvereign_core::AuditLogStore;
use solvereign_core::AuditSeverity;
use solvereign_core::GENESIS_HASH;
use solvereign_core::HashAlgorithm;
use solvereign_core::HashDigest;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::UserId;

use crate::codec::decode_hash;
use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::codec::hash_columns;
use crate::config::SqliteStoreError;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl AuditLogStore for SqliteStore {
    fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
        let (prev_algorithm, prev_value) = hash_columns(&event.prev_hash);
        let (entry_algorithm, entry_value) = hash_columns(&event.entry_hash);
        let payload_json = encode_json(&event.payload).map_err(StoreError::from)?;
        let mut guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(map_sqlite_error)?;
        let current_max: Option<i64> = tx
            .query_row("SELECT MAX(sequence) FROM audit_log WHERE tenant_id = ?1", params![event.tenant_id.as_str()], |row| {
                row.get(0)
            })
            .map_err(map_sqlite_error)?;
        let expected_next = current_max.unwrap_or(0) + 1;
        if i64::try_from(event.sequence).unwrap_or(i64::MAX) != expected_next {
            return Err(StoreError::from(SqliteStoreError::Conflict(format!(
                "audit log sequence {} is not the next sequence ({expected_next}) for tenant {}",
                event.sequence,
                event.tenant_id.as_str()
            ))));
        }
        tx.execute(
            "INSERT INTO audit_log (id, tenant_id, sequence, action, actor_user_id, payload, severity, \
             prev_hash_algorithm, prev_hash_value, entry_hash_algorithm, entry_hash_value, \
             occurred_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                event.id.as_str(),
                event.tenant_id.as_str(),
                event.sequence,
                event.action,
                event.actor_user_id.as_ref().map(UserId::as_str),
                payload_json,
                audit_severity_label(event.severity),
                prev_algorithm,
                prev_value,
                entry_algorithm,
                entry_value,
                event.occurred_at.unix_seconds(),
            ],
        )
        .map_err(map_sqlite_error)?;
        tx.commit().map_err(map_sqlite_error)?;
        Ok(())
    }

    fn latest_entry_hash(&self, tenant_id: &TenantId) -> Result<HashDigest, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT entry_hash_algorithm, entry_hash_value FROM audit_log WHERE tenant_id = \
                 ?1 ORDER BY sequence DESC LIMIT 1",
                params![tenant_id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(map_sqlite_error)?;
        match row {
            Some((algorithm, value)) => decode_hash(&algorithm, &value).map_err(StoreError::from),
            None => Ok(HashDigest { algorithm: HashAlgorithm::Sha256, value: GENESIS_HASH.to_string() }),
        }
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<AuditEvent>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare(
                "SELECT id, tenant_id, sequence, action, actor_user_id, payload, severity, \
                 prev_hash_algorithm, prev_hash_value, entry_hash_algorithm, entry_hash_value, \
                 occurred_at FROM audit_log WHERE tenant_id = ?1 ORDER BY sequence",
            )
            .map_err(map_sqlite_error)?;
        let rows = stmt.query_map(params![tenant_id.as_str()], map_audit_row).map_err(map_sqlite_error)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(decode_audit(row.map_err(map_sqlite_error)?).map_err(StoreError::from)?);
        }
        Ok(events)
    }
}

struct AuditRow {
    id: String,
    tenant_id: String,
    sequence: u64,
    action: String,
    actor_user_id: Option<String>,
    payload: String,
    severity: String,
    prev_hash_algorithm: String,
    prev_hash_value: String,
    entry_hash_algorithm: String,
    entry_hash_value: String,
    occurred_at: i64,
}

fn map_audit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRow> {
    Ok(AuditRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        sequence: row.get(2)?,
        action: row.get(3)?,
        actor_user_id: row.get(4)?,
        payload: row.get(5)?,
        severity: row.get(6)?,
        prev_hash_algorithm: row.get(7)?,
        prev_hash_value: row.get(8)?,
        entry_hash_algorithm: row.get(9)?,
        entry_hash_value: row.get(10)?,
        occurred_at: row.get(11)?,
    })
}

fn decode_audit(row: AuditRow) -> Result<AuditEvent, SqliteStoreError> {
    Ok(AuditEvent {
        id: AuditEventId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        sequence: row.sequence,
        action: row.action,
        actor_user_id: row.actor_user_id.map(UserId::new),
        payload: decode_json(&row.payload)?,
        severity: parse_audit_severity(&row.severity)?,
        prev_hash: decode_hash(&row.prev_hash_algorithm, &row.prev_hash_value)?,
        entry_hash: decode_hash(&row.entry_hash_algorithm, &row.entry_hash_value)?,
        occurred_at: Timestamp::from_unix_seconds(row.occurred_at),
    })
}

const fn audit_severity_label(severity: AuditSeverity) -> &'static str {
    match severity {
        AuditSeverity::Info => "INFO",
        AuditSeverity::Warning => "WARNING",
        AuditSeverity::High => "HIGH",
    }
}

fn parse_audit_severity(label: &str) -> Result<AuditSeverity, SqliteStoreError> {
    match label {
        "INFO" => Ok(AuditSeverity::Info),
        "WARNING" => Ok(AuditSeverity::Warning),
        "HIGH" => Ok(AuditSeverity::High),
        other => Err(SqliteStoreError::Corrupt(format!("unknown audit severity: {other}"))),
    }
}
