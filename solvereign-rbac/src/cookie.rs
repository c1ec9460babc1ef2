// solvereign-rbac/src/cookie.rs
// ============================================================================
// Module: Session Cookie
// Description: Random cookie value generation and `Set-Cookie` construction.
// Purpose: Back C2's cookie contract (spec §4.2): `__Host-`-prefixed in
//   production, Secure, HttpOnly, SameSite=strict, Path=/, no Domain.
// Dependencies: rand, base64
// ============================================================================

//! ## Overview
//! The cookie *value* is random, opaque bytes; it is never interpreted by the
//! server, only hashed ([`crate::session::hash_cookie_value`]) and compared
//! against the stored [`solvereign_core::Session::session_hash`]. The cookie
//! *name* carries the `__Host-` prefix outside local development, which
//! instructs the browser to refuse the cookie unless it was also set with
//! `Secure`, no `Domain`, and `Path=/` — a second enforcement layer for the
//! same properties this module already sets explicitly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Session time-to-live, per spec §4.2.
pub const SESSION_TTL_SECONDS: i64 = 8 * 3600;

/// Random bytes of entropy in a fresh cookie value.
const COOKIE_VALUE_BYTES: usize = 32;

/// Cookie name used in production (TLS-terminated) deployments.
pub const PRODUCTION_COOKIE_NAME: &str = "__Host-solvereign_session";

/// Cookie name used in local/non-TLS development, where `__Host-` would be
/// rejected by the browser outright.
pub const DEVELOPMENT_COOKIE_NAME: &str = "solvereign_session";

// ============================================================================
// SECTION: Cookie Value
// ============================================================================

/// Generates a fresh, URL-safe random cookie value.
#[must_use]
pub fn generate_cookie_value() -> String {
    let mut bytes = [0_u8; COOKIE_VALUE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// ============================================================================
// SECTION: Set-Cookie Header
// ============================================================================

/// Builds a `Set-Cookie` header value for a freshly issued session.
///
/// `secure` selects between the `__Host-`-prefixed production name (which
/// requires `Secure`) and the unprefixed development name. Callers must pass
/// `secure = true` for any deployment reachable over the network.
#[must_use]
pub fn build_set_cookie_header(value: &str, secure: bool, max_age_seconds: i64) -> String {
    let name = if secure { PRODUCTION_COOKIE_NAME } else { DEVELOPMENT_COOKIE_NAME };
    let mut header = format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_seconds}");
    if secure {
        header.push_str("; Secure");
    }
    header
}

/// Builds a `Set-Cookie` header that immediately expires a session cookie,
/// for use on logout.
#[must_use]
pub fn build_clear_cookie_header(secure: bool) -> String {
    build_set_cookie_header("", secure, 0)
}

#[cfg(test)]
mod tests {
    use super::build_clear_cookie_header;
    use super::build_set_cookie_header;
    use super::generate_cookie_value;

    #[test]
    fn generated_values_are_distinct_and_nonempty() {
        let a = generate_cookie_value();
        let b = generate_cookie_value();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn production_header_carries_host_prefix_and_secure() {
        let header = build_set_cookie_header("abc", true, 28_800);
        assert!(header.starts_with("__Host-solvereign_session=abc;"));
        assert!(header.contains("Secure"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Strict"));
        assert!(!header.contains("Domain="));
    }

    #[test]
    fn development_header_omits_host_prefix_and_secure() {
        let header = build_set_cookie_header("abc", false, 28_800);
        assert!(header.starts_with("solvereign_session=abc;"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn clear_cookie_zeroes_max_age() {
        let header = build_clear_cookie_header(true);
        assert!(header.contains("Max-Age=0"));
    }
}
