// solvereign-store-sqlite/src/killswitch.rs
// ============================================================================
// Module: Kill Switch Store
// Description: SQLite-backed KillSwitchStore.
// Purpose: Implement C14's per-site, per-capability kill switches (spec
//   §4.10 requires mutations visible within 5 seconds).
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::KillSwitchStore;
use solvereign_core::SiteId;
use solvereign_core::StoreError;
use solvereign_core::TenantId;

use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl KillSwitchStore for SqliteStore {
    fn is_enabled(&self, tenant_id: &TenantId, site_id: &SiteId, capability: &str) -> Result<bool, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let enabled: Option<bool> = guard
            .query_row(
                "SELECT enabled FROM kill_switches WHERE tenant_id = ?1 AND site_id = ?2 AND \
                 capability = ?3",
                params![tenant_id.as_str(), site_id.as_str(), capability],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite_error)?;
        Ok(enabled.unwrap_or(false))
    }

    fn set_enabled(&self, tenant_id: &TenantId, site_id: &SiteId, capability: &str, enabled: bool) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO kill_switches (tenant_id, site_id, capability, enabled) VALUES \
                 (?1, ?2, ?3, ?4) ON CONFLICT (tenant_id, site_id, capability) DO UPDATE SET \
                 enabled = excluded.enabled",
                params![tenant_id.as_str(), site_id.as_str(), capability, enabled],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }
}
