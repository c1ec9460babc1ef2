// solvereign-rbac/src/errors.rs
// ============================================================================
// Module: RBAC Errors
// Description: Error taxonomy for login, session validation, and permission
//   checks.
// Purpose: Distinguish authentication failure, authorization denial, and
//   internal error without leaking which case applies across the auth
//   boundary (spec §4.2's `AUTH_FAIL`/`FORBIDDEN` response codes).
// Dependencies: solvereign-core, thiserror
// ============================================================================

use solvereign_core::StoreError;
use thiserror::Error;

/// Errors raised by login, session validation, and permission checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login or session lookup failed: unknown email, wrong password,
    /// expired or revoked session. Deliberately undifferentiated so a caller
    /// cannot distinguish "wrong password" from "unknown user" by error
    /// shape; maps to the wire-level `AUTH_FAIL` code.
    #[error("authentication failed")]
    Unauthenticated,
    /// Caller is authenticated but lacks the required permission. Maps to
    /// the wire-level `FORBIDDEN` code.
    #[error("permission denied: missing {0}")]
    Unauthorized(String),
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// An internal invariant was violated (e.g. the KDF rejected its own
    /// fixed parameters).
    #[error("internal auth error: {0}")]
    Internal(String),
}
