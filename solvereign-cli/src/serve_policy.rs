// solvereign-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the CLI server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: solvereign-config, std
// ============================================================================

//! ## Overview
//! Provides safety checks for binding the HTTP server to non-loopback
//! addresses. The policy is fail-closed: exposing the bind address beyond
//! loopback requires an explicit opt-in, since the RBAC session cookie is
//! the only perimeter this server has.
//!
//! Security posture: fail closed on unsafe bind configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::SocketAddr;

use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "SOLVEREIGN_ALLOW_NON_LOOPBACK";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Resolved bind outcome for the `serve` command.
///
/// # Invariants
/// - `network_exposed` is `true` only for a non-loopback bind address.
#[derive(Debug, Clone, Copy)]
pub struct BindOutcome {
    /// Parsed socket address the server will listen on.
    pub bind_addr: SocketAddr,
    /// True when the server is bound to a non-loopback address.
    pub network_exposed: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Serve policy failures for bind safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Bind string failed to parse.
    InvalidBind {
        /// Raw bind value.
        bind: String,
        /// Parse error message.
        error: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: String,
    },
}

impl std::fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::InvalidEnv { value } => {
                t!("serve.bind.allow_env_invalid", env = ALLOW_NON_LOOPBACK_ENV, value = value)
            }
            Self::InvalidBind { bind, error } => {
                t!("serve.bind.parse_failed", bind = bind, error = error)
            }
            Self::NonLoopbackOptInRequired { bind } => {
                t!("serve.bind.non_loopback_opt_in", bind = bind, env = ALLOW_NON_LOOPBACK_ENV)
            }
        };
        write!(f, "{message}")
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Resolves the non-loopback opt-in flag from the CLI flag and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_allow_non_loopback_value(&value)
}

/// Validates `bind` against the non-loopback opt-in policy.
///
/// # Errors
/// Returns [`ServePolicyError`] when `bind` does not parse, or is a
/// non-loopback address without `allow_non_loopback` set.
pub fn enforce_bind_policy(bind: &str, allow_non_loopback: bool) -> Result<BindOutcome, ServePolicyError> {
    let addr: SocketAddr = bind.parse().map_err(|err: std::net::AddrParseError| ServePolicyError::InvalidBind {
        bind: bind.to_string(),
        error: err.to_string(),
    })?;
    if addr.ip().is_loopback() {
        return Ok(BindOutcome { bind_addr: addr, network_exposed: false });
    }
    if !allow_non_loopback {
        return Err(ServePolicyError::NonLoopbackOptInRequired { bind: bind.to_string() });
    }
    Ok(BindOutcome { bind_addr: addr, network_exposed: true })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a bool-ish string (true/false/1/0/yes/no/on/off).
fn parse_boolish(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses an env value for allow-non-loopback.
pub(crate) fn parse_allow_non_loopback_value(value: &str) -> Result<bool, ServePolicyError> {
    parse_boolish(value)
        .map_or_else(|| Err(ServePolicyError::InvalidEnv { value: value.to_string() }), Ok)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]

    use super::enforce_bind_policy;
    use super::parse_allow_non_loopback_value;

    #[test]
    fn loopback_bind_is_always_allowed() {
        let outcome = enforce_bind_policy("127.0.0.1:8080", false).expect("loopback bind is allowed");
        assert!(!outcome.network_exposed);
    }

    #[test]
    fn non_loopback_bind_requires_opt_in() {
        let result = enforce_bind_policy("0.0.0.0:8080", false);
        assert!(result.is_err());
    }

    #[test]
    fn non_loopback_bind_allowed_with_opt_in() {
        let outcome = enforce_bind_policy("0.0.0.0:8080", true).expect("opt-in allows exposure");
        assert!(outcome.network_exposed);
    }

    #[test]
    fn invalid_bind_string_is_rejected() {
        let result = enforce_bind_policy("not-an-address", false);
        assert!(result.is_err());
    }

    #[test]
    fn boolish_parsing_accepts_common_variants() {
        assert_eq!(parse_allow_non_loopback_value("yes"), Ok(true));
        assert_eq!(parse_allow_non_loopback_value("0"), Ok(false));
        assert!(parse_allow_non_loopback_value("maybe").is_err());
    }
}
