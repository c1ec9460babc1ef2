// solvereign-rbac/src/lib.rs
// ============================================================================
// Module: Solvereign RBAC Library
// Description: Login, session validation, and permission enforcement.
// Purpose: Canonical implementation of C2 (Session & RBAC) against the
//   `solvereign-core` domain model, store-agnostic over `UserStore`/
//   `SessionStore`.
// Dependencies: solvereign-core, argon2, rand
// ============================================================================

//! ## Overview
//! This crate owns the one path by which a request turns a raw session
//! cookie into a trusted [`SessionContext`]: [`login`] mints a session,
//! [`validate`] resolves one, and [`require_permission`] gates an operation
//! against it. Tenant scope always comes from the session row created at
//! login time, never from anything the caller sends on a later request.
//! The HTTP server wires these functions into its request pipeline; this
//! crate itself has no HTTP dependency.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod audit;
mod cookie;
mod errors;
mod password;
mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuthAuditEvent;
pub use audit::AuthAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use cookie::DEVELOPMENT_COOKIE_NAME;
pub use cookie::PRODUCTION_COOKIE_NAME;
pub use cookie::SESSION_TTL_SECONDS;
pub use cookie::build_clear_cookie_header;
pub use cookie::build_set_cookie_header;
pub use cookie::generate_cookie_value;
pub use errors::AuthError;
pub use password::hash_password;
pub use password::verify_password;
pub use session::LoginOutcome;
pub use session::SessionContext;
pub use session::hash_cookie_value;
pub use session::login;
pub use session::logout;
pub use session::require_permission;
pub use session::validate;
