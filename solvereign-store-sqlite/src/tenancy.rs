// solvereign-store-sqlite/src/tenancy.rs
// ============================================================================
// Module: Tenant, Site & User Stores
// Description: SQLite-backed TenantStore, SiteStore, and UserStore.
// Purpose: Implement C1's identity and tenant persistence.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::Role;
use solvereign_core::Site;
use solvereign_core::SiteId;
use solvereign_core::SiteStore;
use solvereign_core::StoreError;
use solvereign_core::Tenant;
use solvereign_core::TenantId;
use solvereign_core::TenantStore;
use solvereign_core::Timestamp;
use solvereign_core::User;
use solvereign_core::UserId;
use solvereign_core::UserStore;

use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

// ============================================================================
// SECTION: TenantStore
// ============================================================================

impl TenantStore for SqliteStore {
    fn create(&self, tenant: &Tenant) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO tenants (id, code, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![tenant.id.as_str(), tenant.code, tenant.name, tenant.created_at.unix_seconds()],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .query_row(
                "SELECT id, code, name, created_at FROM tenants WHERE id = ?1",
                params![id.as_str()],
                map_tenant_row,
            )
            .optional()
            .map_err(map_sqlite_error)
            .map_err(StoreError::from)
    }
}

fn map_tenant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: TenantId::new(row.get::<_, String>(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
        created_at: Timestamp::from_unix_seconds(row.get(3)?),
    })
}

// ============================================================================
// SECTION: SiteStore
// ============================================================================

impl SiteStore for SqliteStore {
    fn create(&self, site: &Site) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO sites (id, tenant_id, site_code, name, publish_enabled) VALUES \
                 (?1, ?2, ?3, ?4, ?5)",
                params![site.id.as_str(), site.tenant_id.as_str(), site.site_code, site.name, site.publish_enabled],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &SiteId) -> Result<Option<Site>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .query_row(
                "SELECT id, tenant_id, site_code, name, publish_enabled FROM sites WHERE tenant_id = ?1 AND \
                 id = ?2",
                params![tenant_id.as_str(), id.as_str()],
                map_site_row,
            )
            .optional()
            .map_err(map_sqlite_error)
            .map_err(StoreError::from)
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<Site>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare("SELECT id, tenant_id, site_code, name, publish_enabled FROM sites WHERE tenant_id = ?1 ORDER BY site_code")
            .map_err(map_sqlite_error)?;
        let rows = stmt.query_map(params![tenant_id.as_str()], map_site_row).map_err(map_sqlite_error)?;
        let mut sites = Vec::new();
        for row in rows {
            sites.push(row.map_err(map_sqlite_error)?);
        }
        Ok(sites)
    }

    fn set_publish_enabled(&self, tenant_id: &TenantId, id: &SiteId, enabled: bool) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE sites SET publish_enabled = ?1 WHERE tenant_id = ?2 AND id = ?3",
                params![enabled, tenant_id.as_str(), id.as_str()],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown site: {}", id.as_str())));
        }
        Ok(())
    }
}

fn map_site_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: SiteId::new(row.get::<_, String>(0)?),
        tenant_id: TenantId::new(row.get::<_, String>(1)?),
        site_code: row.get(2)?,
        name: row.get(3)?,
        publish_enabled: row.get(4)?,
    })
}

// ============================================================================
// SECTION: UserStore
// ============================================================================

impl UserStore for SqliteStore {
    fn create(&self, user: &User) -> Result<(), StoreError> {
        let roles_json = encode_json(&user.roles).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO users (id, email, password_hash, tenant_id, is_platform, roles_json, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id.as_str(),
                    user.email,
                    user.password_hash,
                    user.tenant_id.as_ref().map(TenantId::as_str),
                    user.is_platform,
                    roles_json,
                    user.created_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT id, email, password_hash, tenant_id, is_platform, roles_json, created_at FROM \
                 users WHERE id = ?1",
                params![id.as_str()],
                map_user_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_user).transpose().map_err(StoreError::from)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let normalized = email.trim().to_lowercase();
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT id, email, password_hash, tenant_id, is_platform, roles_json, created_at FROM \
                 users WHERE email = ?1",
                params![normalized],
                map_user_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_user).transpose().map_err(StoreError::from)
    }
}

/// Raw columns read for a `users` row, decoded into a [`User`] by the caller
/// once outside the borrow of the `rusqlite` row.
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    tenant_id: Option<String>,
    is_platform: bool,
    roles_json: String,
    created_at: i64,
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        tenant_id: row.get(3)?,
        is_platform: row.get(4)?,
        roles_json: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn decode_user(row: UserRow) -> Result<User, crate::config::SqliteStoreError> {
    let roles = decode_json::<Vec<Role>>(&row.roles_json)?;
    Ok(User {
        id: UserId::new(row.id),
        email: row.email,
        password_hash: row.password_hash,
        tenant_id: row.tenant_id.map(TenantId::new),
        is_platform: row.is_platform,
        roles,
        created_at: Timestamp::from_unix_seconds(row.created_at),
    })
}
