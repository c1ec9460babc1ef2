// solvereign-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Store
// Description: Durable SQLite-backed implementation of every solvereign-core
//   store trait.
// Purpose: Provide production-grade, single-writer persistence for the
//   lifecycle engine's tenants, plans, repairs, approvals, and audit log.
// Dependencies: solvereign-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate implements all fourteen store traits from `solvereign-core`
//! against a single `SQLite` connection under WAL journaling
//! ([`SqliteStore`]). Append-only and near-immutability invariants
//! (`audit_log`, `snapshots`) are enforced at the SQL layer with triggers in
//! addition to the Rust-level method contracts, so a bypass of one layer is
//! still caught by the other.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod approval;
mod audit;
mod codec;
mod concurrency;
mod config;
mod killswitch;
mod mapping;
mod now;
mod plan;
mod repair;
mod schema;
mod session;
mod store;
mod tenancy;
mod violations;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::SqliteStoreConfig;
pub use config::SqliteStoreError;
pub use config::SqliteStoreMode;
pub use config::SqliteSyncMode;
pub use store::SqliteStore;
