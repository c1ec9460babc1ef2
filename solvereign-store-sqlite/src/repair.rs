// solvereign-store-sqlite/src/repair.rs
// ============================================================================
// Module: Repair Session Store
// Description: SQLite-backed RepairSessionStore.
// Purpose: Implement C7's repair-session persistence, including the
//   at-most-one-open-session-per-plan invariant.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::IdempotencyActionKey;
use solvereign_core::PlanId;
use solvereign_core::RepairSession;
use solvereign_core::RepairSessionId;
use solvereign_core::RepairSessionStore;
use solvereign_core::RepairStatus;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::UserId;

use crate::codec::decode_hash;
use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::codec::hash_columns;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl RepairSessionStore for SqliteStore {
    fn create(&self, session: &RepairSession) -> Result<(), StoreError> {
        let requested_changes = encode_json(&session.requested_changes).map_err(StoreError::from)?;
        let preview_payload = encode_json(&session.preview_payload).map_err(StoreError::from)?;
        let undo_payload = session.undo_payload.as_ref().map(encode_json).transpose().map_err(StoreError::from)?;
        let (baseline_hash_algorithm, baseline_hash_value) = hash_columns(&session.baseline_assignments_hash);
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO repair_sessions (id, tenant_id, plan_version_id, created_by, \
                 created_at, expires_at, status, requested_changes, preview_payload, \
                 baseline_assignments_hash_algorithm, baseline_assignments_hash_value, \
                 undo_payload, idempotency_key) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13)",
                params![
                    session.id.as_str(),
                    session.tenant_id.as_str(),
                    session.plan_version_id.as_str(),
                    session.created_by.as_str(),
                    session.created_at.unix_seconds(),
                    session.expires_at.unix_seconds(),
                    repair_status_label(session.status),
                    requested_changes,
                    preview_payload,
                    baseline_hash_algorithm,
                    baseline_hash_value,
                    undo_payload,
                    session.idempotency_key.as_ref().map(IdempotencyActionKey::as_str),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &RepairSessionId) -> Result<Option<RepairSession>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                &format!("{REPAIR_SELECT} WHERE tenant_id = ?1 AND id = ?2"),
                params![tenant_id.as_str(), id.as_str()],
                map_repair_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_repair).transpose().map_err(StoreError::from)
    }

    fn find_open_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Option<RepairSession>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                &format!("{REPAIR_SELECT} WHERE tenant_id = ?1 AND plan_version_id = ?2 AND status = 'OPEN'"),
                params![tenant_id.as_str(), plan_version_id.as_str()],
                map_repair_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_repair).transpose().map_err(StoreError::from)
    }

    fn update(&self, session: &RepairSession) -> Result<(), StoreError> {
        let undo_payload = session.undo_payload.as_ref().map(encode_json).transpose().map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE repair_sessions SET status = ?1, undo_payload = ?2 WHERE tenant_id = ?3 \
                 AND id = ?4",
                params![repair_status_label(session.status), undo_payload, session.tenant_id.as_str(), session.id.as_str()],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown repair session: {}", session.id.as_str())));
        }
        Ok(())
    }
}

const REPAIR_SELECT: &str = "SELECT id, tenant_id, plan_version_id, created_by, created_at, expires_at, status, \
     requested_changes, preview_payload, baseline_assignments_hash_algorithm, \
     baseline_assignments_hash_value, undo_payload, idempotency_key FROM repair_sessions";

const fn repair_status_label(status: RepairStatus) -> &'static str {
    match status {
        RepairStatus::Open => "OPEN",
        RepairStatus::Applied => "APPLIED",
        RepairStatus::Undone => "UNDONE",
        RepairStatus::Aborted => "ABORTED",
        RepairStatus::Expired => "EXPIRED",
    }
}

fn parse_repair_status(label: &str) -> Result<RepairStatus, crate::config::SqliteStoreError> {
    match label {
        "OPEN" => Ok(RepairStatus::Open),
        "APPLIED" => Ok(RepairStatus::Applied),
        "UNDONE" => Ok(RepairStatus::Undone),
        "ABORTED" => Ok(RepairStatus::Aborted),
        "EXPIRED" => Ok(RepairStatus::Expired),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown repair status: {other}"))),
    }
}

struct RepairRow {
    id: String,
    tenant_id: String,
    plan_version_id: String,
    created_by: String,
    created_at: i64,
    expires_at: i64,
    status: String,
    requested_changes: String,
    preview_payload: String,
    baseline_assignments_hash_algorithm: String,
    baseline_assignments_hash_value: String,
    undo_payload: Option<String>,
    idempotency_key: Option<String>,
}

fn map_repair_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepairRow> {
    Ok(RepairRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        plan_version_id: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
        status: row.get(6)?,
        requested_changes: row.get(7)?,
        preview_payload: row.get(8)?,
        baseline_assignments_hash_algorithm: row.get(9)?,
        baseline_assignments_hash_value: row.get(10)?,
        undo_payload: row.get(11)?,
        idempotency_key: row.get(12)?,
    })
}

fn decode_repair(row: RepairRow) -> Result<RepairSession, crate::config::SqliteStoreError> {
    let undo_payload = row.undo_payload.as_deref().map(decode_json).transpose()?;
    let baseline_assignments_hash =
        decode_hash(&row.baseline_assignments_hash_algorithm, &row.baseline_assignments_hash_value)?;
    Ok(RepairSession {
        id: RepairSessionId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        plan_version_id: PlanId::new(row.plan_version_id),
        created_by: UserId::new(row.created_by),
        created_at: Timestamp::from_unix_seconds(row.created_at),
        expires_at: Timestamp::from_unix_seconds(row.expires_at),
        status: parse_repair_status(&row.status)?,
        requested_changes: decode_json(&row.requested_changes)?,
        preview_payload: decode_json(&row.preview_payload)?,
        baseline_assignments_hash,
        undo_payload,
        idempotency_key: row.idempotency_key.map(IdempotencyActionKey::new),
    })
}
