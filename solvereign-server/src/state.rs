// solvereign-server/src/state.rs
// ============================================================================
// Module: Application State
// Description: Shared handle wiring the store, solver, config, and audit sinks.
// Purpose: Single `Clone`-able state object threaded through every handler.
// Dependencies: solvereign-core, solvereign-config, solvereign-store-sqlite
// ============================================================================

//! ## Overview
//! [`AppState`] is the one object every route handler receives via axum's
//! `State` extractor. It owns no request-scoped data; everything here is
//! long-lived for the life of the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use solvereign_config::SolvereignConfig;
use solvereign_core::PlanSolver;
use solvereign_store_sqlite::SqliteStore;

use crate::audit_sink::AuditSink;
use crate::solve_cache::SolveCache;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared application state, cloned cheaply (every field is an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Durable store backing every governance aggregate.
    pub store: Arc<SqliteStore>,
    /// Solver gateway adapter selected by [`SolvereignConfig::solver`].
    pub solver: Arc<dyn PlanSolver + Send + Sync>,
    /// Resolved runtime configuration.
    pub config: Arc<SolvereignConfig>,
    /// Sink every governance audit event is mirrored through.
    pub audit: Arc<dyn AuditSink>,
    /// Sink every authentication/authorization decision is mirrored through.
    pub auth_audit: Arc<dyn solvereign_rbac::AuthAuditSink>,
    /// In-process cache of each plan's last solve inputs/assignments.
    pub solve_cache: Arc<SolveCache>,
}

impl AppState {
    /// Builds a new application state from its constituent parts.
    #[must_use]
    pub fn new(
        store: Arc<SqliteStore>,
        solver: Arc<dyn PlanSolver + Send + Sync>,
        config: Arc<SolvereignConfig>,
        audit: Arc<dyn AuditSink>,
        auth_audit: Arc<dyn solvereign_rbac::AuthAuditSink>,
    ) -> Self {
        Self {
            store,
            solver,
            config,
            audit,
            auth_audit,
            solve_cache: Arc::new(SolveCache::new()),
        }
    }
}
