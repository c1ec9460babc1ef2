// solvereign-store-sqlite/src/mapping.rs
// ============================================================================
// Module: External Mapping Store
// Description: SQLite-backed ExternalMappingStore.
// Purpose: Implement C3's external-identifier mapping persistence.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::ExternalMapping;
use solvereign_core::ExternalMappingId;
use solvereign_core::ExternalMappingStore;
use solvereign_core::MappingSyncStatus;
use solvereign_core::StoreError;
use solvereign_core::TenantId;

use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl ExternalMappingStore for SqliteStore {
    fn find(
        &self,
        tenant_id: &TenantId,
        external_system: &str,
        entity_type: &str,
        external_id: &str,
    ) -> Result<Option<ExternalMapping>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .query_row(
                "SELECT id, tenant_id, external_system, entity_type, external_id, internal_id, \
                 sync_status FROM external_mappings WHERE tenant_id = ?1 AND external_system = ?2 AND \
                 entity_type = ?3 AND external_id = ?4",
                params![tenant_id.as_str(), external_system, entity_type, external_id],
                map_mapping_row,
            )
            .optional()
            .map_err(map_sqlite_error)?
            .transpose()
            .map_err(StoreError::from)
    }

    fn create(&self, mapping: &ExternalMapping) -> Result<(), StoreError> {
        let sync_status = sync_status_label(mapping.sync_status);
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO external_mappings (id, tenant_id, external_system, entity_type, \
                 external_id, internal_id, sync_status) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    mapping.id.as_str(),
                    mapping.tenant_id.as_str(),
                    mapping.external_system,
                    mapping.entity_type,
                    mapping.external_id,
                    mapping.internal_id,
                    sync_status,
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn deprecate(&self, id: &ExternalMappingId) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE external_mappings SET sync_status = 'deprecated' WHERE id = ?1",
                params![id.as_str()],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown external mapping: {}", id.as_str())));
        }
        Ok(())
    }
}

const fn sync_status_label(status: MappingSyncStatus) -> &'static str {
    match status {
        MappingSyncStatus::Active => "active",
        MappingSyncStatus::Deprecated => "deprecated",
    }
}

fn parse_sync_status(label: &str) -> Result<MappingSyncStatus, crate::config::SqliteStoreError> {
    match label {
        "active" => Ok(MappingSyncStatus::Active),
        "deprecated" => Ok(MappingSyncStatus::Deprecated),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown mapping sync status: {other}"))),
    }
}

fn map_mapping_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<ExternalMapping, crate::config::SqliteStoreError>> {
    let sync_status_raw: String = row.get(6)?;
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let external_system: String = row.get(2)?;
    let entity_type: String = row.get(3)?;
    let external_id: String = row.get(4)?;
    let internal_id: String = row.get(5)?;
    Ok(parse_sync_status(&sync_status_raw).map(|sync_status| ExternalMapping {
        id: ExternalMappingId::new(id),
        tenant_id: TenantId::new(tenant_id),
        external_system,
        entity_type,
        external_id,
        internal_id,
        sync_status,
    }))
}
