// solvereign-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Store
// Description: Shared connection handle for every aggregate store module.
// Purpose: Own the single SQLite connection and schema lifecycle; each
//   per-aggregate module implements its store traits against it.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

//! ## Overview
//! [`SqliteStore`] is a thin, cloneable handle around one `SQLite`
//! connection guarded by a mutex. Every store trait in this crate is
//! implemented directly on this type (see the sibling modules); there is no
//! per-aggregate connection pooling, mirroring the single-writer design the
//! WAL journal mode already assumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::config::SqliteStoreConfig;
use crate::config::SqliteStoreError;
use crate::config::ensure_parent_dir;
use crate::config::open_connection;
use crate::config::validate_store_path;
use crate::schema::initialize_schema;

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed implementation of every store trait in `solvereign-core`.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared `SQLite` connection guarded by a mutex.
    pub(crate) connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed store, creating and initializing the
    /// database file if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Opens an in-memory store, useful for tests and short-lived tooling.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the in-memory database cannot be
    /// initialized.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let mut connection = Connection::open_in_memory().map_err(crate::config::map_sqlite_error)?;
        connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(crate::config::map_sqlite_error)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }
}
