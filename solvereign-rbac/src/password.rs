// solvereign-rbac/src/password.rs
// ============================================================================
// Module: Password Hashing
// Description: Argon2id password hashing and constant-time verification.
// Purpose: Back C2's login path with fixed, non-tenant-configurable KDF
//   parameters (spec §4.2 — interactive login latency, not a policy knob).
// Dependencies: argon2
// ============================================================================

//! ## Overview
//! Every tenant shares the same Argon2id parameters. The cost is chosen for
//! interactive login latency, not for per-tenant security policy, so unlike
//! most of this crate's knobs it is never read from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::Version;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;

use crate::AuthError;

// ============================================================================
// SECTION: Fixed Parameters
// ============================================================================

/// Memory cost in KiB (19 MiB), OWASP's minimum recommendation for Argon2id.
const ARGON2_MEMORY_COST_KIB: u32 = 19_456;
/// Iteration count.
const ARGON2_TIME_COST: u32 = 2;
/// Degree of parallelism.
const ARGON2_PARALLELISM: u32 = 1;

/// Builds an `Argon2id` instance with this module's fixed parameters.
fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(ARGON2_MEMORY_COST_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, None)
        .map_err(|err| AuthError::Internal(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Hashes `password` into a PHC string suitable for [`solvereign_core::User::password_hash`].
///
/// # Errors
///
/// Returns [`AuthError::Internal`] if the underlying KDF call fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Internal(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies `password` against a stored PHC hash in constant time.
///
/// Returns `false` (never an error) for a wrong password; a malformed stored
/// hash is treated as a verification failure rather than surfaced to the
/// caller, since a corrupt hash must never leak through as a distinguishable
/// error from "wrong password".
#[must_use]
pub fn verify_password(password: &str, phc_hash: &str) -> bool {
    let Ok(hasher) = hasher() else {
        return false;
    };
    let Ok(parsed) = PasswordHash::new(phc_hash) else {
        return false;
    };
    hasher.verify_password(password.as_bytes(), &parsed).is_ok()
}
