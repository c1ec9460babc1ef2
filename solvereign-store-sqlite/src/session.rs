// solvereign-store-sqlite/src/session.rs
// ============================================================================
// Module: Session Store
// Description: SQLite-backed SessionStore.
// Purpose: Implement C2's session persistence, looked up only by hash.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::Session;
use solvereign_core::SessionId;
use solvereign_core::SessionStore;
use solvereign_core::SiteId;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::UserId;

use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl SessionStore for SqliteStore {
    fn create(&self, session: &Session) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO sessions (id, user_id, session_hash, tenant_id, site_id, \
                 is_platform_scope, expires_at, revoked_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    session.id.as_str(),
                    session.user_id.as_str(),
                    session.session_hash,
                    session.tenant_id.as_ref().map(TenantId::as_str),
                    session.site_id.as_ref().map(SiteId::as_str),
                    session.is_platform_scope,
                    session.expires_at.unix_seconds(),
                    session.revoked_at.map(Timestamp::unix_seconds),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get_by_hash(&self, session_hash: &str) -> Result<Option<Session>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .query_row(
                "SELECT id, user_id, session_hash, tenant_id, site_id, is_platform_scope, \
                 expires_at, revoked_at FROM sessions WHERE session_hash = ?1",
                params![session_hash],
                map_session_row,
            )
            .optional()
            .map_err(map_sqlite_error)
            .map_err(StoreError::from)
    }

    fn revoke(&self, id: &SessionId) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE sessions SET revoked_at = ?1 WHERE id = ?2 AND revoked_at IS NULL",
                params![crate::now::unix_now_seconds(), id.as_str()],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown or already-revoked session: {}", id.as_str())));
        }
        Ok(())
    }
}

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let tenant_id: Option<String> = row.get(3)?;
    let site_id: Option<String> = row.get(4)?;
    let revoked_at: Option<i64> = row.get(7)?;
    Ok(Session {
        id: SessionId::new(row.get::<_, String>(0)?),
        user_id: UserId::new(row.get::<_, String>(1)?),
        session_hash: row.get(2)?,
        tenant_id: tenant_id.map(TenantId::new),
        site_id: site_id.map(SiteId::new),
        is_platform_scope: row.get(5)?,
        expires_at: Timestamp::from_unix_seconds(row.get(6)?),
        revoked_at: revoked_at.map(Timestamp::from_unix_seconds),
    })
}
