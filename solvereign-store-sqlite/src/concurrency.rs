// solvereign-store-sqlite/src/concurrency.rs
// ============================================================================
// Module: Idempotency & Advisory Lock Stores
// Description: SQLite-backed IdempotencyStore and AdvisoryLockStore.
// Purpose: Implement C11/C12's request deduplication and single-writer
//   plan locking.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::AdvisoryLock;
use solvereign_core::AdvisoryLockStore;
use solvereign_core::IdempotencyActionKey;
use solvereign_core::IdempotencyRecord;
use solvereign_core::IdempotencyStore;
use solvereign_core::PlanId;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;

use crate::codec::decode_hash;
use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::codec::hash_columns;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

// ============================================================================
// SECTION: IdempotencyStore
// ============================================================================

impl IdempotencyStore for SqliteStore {
    fn get(&self, tenant_id: &TenantId, action_key: &IdempotencyActionKey) -> Result<Option<IdempotencyRecord>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT tenant_id, action_key, request_hash_algorithm, request_hash_value, \
                 response_snapshot, created_at FROM idempotency_records WHERE tenant_id = ?1 AND \
                 action_key = ?2",
                params![tenant_id.as_str(), action_key.as_str()],
                map_idempotency_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_idempotency).transpose().map_err(StoreError::from)
    }

    fn put(&self, record: &IdempotencyRecord) -> Result<(), StoreError> {
        let (algorithm, value) = hash_columns(&record.request_hash);
        let response_json = encode_json(&record.response_snapshot).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO idempotency_records (tenant_id, action_key, \
                 request_hash_algorithm, request_hash_value, response_snapshot, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.tenant_id.as_str(),
                    record.action_key.as_str(),
                    algorithm,
                    value,
                    response_json,
                    record.created_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }
}

struct IdempotencyRow {
    tenant_id: String,
    action_key: String,
    request_hash_algorithm: String,
    request_hash_value: String,
    response_snapshot: String,
    created_at: i64,
}

fn map_idempotency_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IdempotencyRow> {
    Ok(IdempotencyRow {
        tenant_id: row.get(0)?,
        action_key: row.get(1)?,
        request_hash_algorithm: row.get(2)?,
        request_hash_value: row.get(3)?,
        response_snapshot: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn decode_idempotency(row: IdempotencyRow) -> Result<IdempotencyRecord, crate::config::SqliteStoreError> {
    Ok(IdempotencyRecord {
        tenant_id: TenantId::new(row.tenant_id),
        action_key: IdempotencyActionKey::new(row.action_key),
        request_hash: decode_hash(&row.request_hash_algorithm, &row.request_hash_value)?,
        response_snapshot: decode_json(&row.response_snapshot)?,
        created_at: Timestamp::from_unix_seconds(row.created_at),
    })
}

// ============================================================================
// SECTION: AdvisoryLockStore
// ============================================================================

impl AdvisoryLockStore for SqliteStore {
    fn try_acquire(&self, lock: &AdvisoryLock) -> Result<bool, StoreError> {
        let mut guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(map_sqlite_error)?;
        let existing: Option<(String, i64)> = tx
            .query_row(
                "SELECT holder_token, expires_at FROM advisory_locks WHERE plan_version_id = ?1",
                params![lock.plan_version_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(map_sqlite_error)?;
        let now = crate::now::unix_now_seconds();
        let held_by_other = matches!(&existing, Some((holder, expires_at)) if holder != &lock.holder_token && *expires_at > now);
        if held_by_other {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO advisory_locks (plan_version_id, tenant_id, holder_token, \
             acquired_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT (plan_version_id) \
             DO UPDATE SET tenant_id = excluded.tenant_id, holder_token = excluded.holder_token, \
             acquired_at = excluded.acquired_at, expires_at = excluded.expires_at",
            params![
                lock.plan_version_id.as_str(),
                lock.tenant_id.as_str(),
                lock.holder_token,
                lock.acquired_at.unix_seconds(),
                lock.expires_at.unix_seconds(),
            ],
        )
        .map_err(map_sqlite_error)?;
        tx.commit().map_err(map_sqlite_error)?;
        Ok(true)
    }

    fn release(&self, tenant_id: &TenantId, plan_version_id: &PlanId, holder_token: &str) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "DELETE FROM advisory_locks WHERE tenant_id = ?1 AND plan_version_id = ?2 AND \
                 holder_token = ?3",
                params![tenant_id.as_str(), plan_version_id.as_str(), holder_token],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }
}
