// solvereign-store-sqlite/src/violations.rs
// ============================================================================
// Module: Violations Cache Store
// Description: SQLite-backed ViolationsCacheStore.
// Purpose: Implement C6's cached-evaluation persistence, replaced wholesale
//   on every re-evaluation.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::PlanId;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::Violation;
use solvereign_core::ViolationsCache;
use solvereign_core::ViolationsCacheStore;

use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl ViolationsCacheStore for SqliteStore {
    fn put(&self, cache: &ViolationsCache) -> Result<(), StoreError> {
        let violations_json = encode_json(&cache.violations).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO violations_cache (plan_version_id, tenant_id, violations, \
                 block_count, warn_count, evaluated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON \
                 CONFLICT (plan_version_id) DO UPDATE SET tenant_id = excluded.tenant_id, \
                 violations = excluded.violations, block_count = excluded.block_count, \
                 warn_count = excluded.warn_count, evaluated_at = excluded.evaluated_at",
                params![
                    cache.plan_version_id.as_str(),
                    cache.tenant_id.as_str(),
                    violations_json,
                    cache.block_count,
                    cache.warn_count,
                    cache.evaluated_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Option<ViolationsCache>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT plan_version_id, tenant_id, violations, block_count, warn_count, \
                 evaluated_at FROM violations_cache WHERE tenant_id = ?1 AND plan_version_id = ?2",
                params![tenant_id.as_str(), plan_version_id.as_str()],
                map_violations_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_violations_cache).transpose().map_err(StoreError::from)
    }
}

struct ViolationsRow {
    plan_version_id: String,
    tenant_id: String,
    violations: String,
    block_count: u32,
    warn_count: u32,
    evaluated_at: i64,
}

fn map_violations_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ViolationsRow> {
    Ok(ViolationsRow {
        plan_version_id: row.get(0)?,
        tenant_id: row.get(1)?,
        violations: row.get(2)?,
        block_count: row.get(3)?,
        warn_count: row.get(4)?,
        evaluated_at: row.get(5)?,
    })
}

fn decode_violations_cache(row: ViolationsRow) -> Result<ViolationsCache, crate::config::SqliteStoreError> {
    Ok(ViolationsCache {
        plan_version_id: PlanId::new(row.plan_version_id),
        tenant_id: TenantId::new(row.tenant_id),
        violations: decode_json::<Vec<Violation>>(&row.violations)?,
        block_count: row.block_count,
        warn_count: row.warn_count,
        evaluated_at: Timestamp::from_unix_seconds(row.evaluated_at),
    })
}
