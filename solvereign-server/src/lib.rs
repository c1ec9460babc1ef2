// solvereign-server/src/lib.rs
// ============================================================================
// Module: Solvereign Server
// Description: HTTP request pipeline and REST handlers over the governance core.
// Purpose: Translate solvereign-core's runtime engines and ApiError taxonomy
//   into the REST surface named in the system's external interfaces.
// Dependencies: solvereign-core, solvereign-rbac, solvereign-store-sqlite,
//   solvereign-solver, solvereign-config, axum, tokio
// ============================================================================

//! ## Overview
//! This crate is a thin HTTP-translation layer. Every governance decision
//! (state transitions, gate evaluation, evidence assembly, error taxonomy)
//! already lives in `solvereign-core`'s runtime engines; this crate's job is
//! routing, session/permission extraction, idempotency and advisory-lock
//! wrapping, and mapping [`solvereign_core::ApiError`] onto an HTTP response.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit_sink;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod solve_cache;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit_sink::AuditSink;
pub use audit_sink::FileAuditSink;
pub use audit_sink::NoopAuditSink;
pub use audit_sink::StderrAuditSink;
pub use error::ErrorResponse;
pub use pipeline::AuthenticatedSession;
pub use router::build_router;
pub use state::AppState;
