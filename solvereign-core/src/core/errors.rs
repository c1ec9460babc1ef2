// solvereign-core/src/core/errors.rs
// ============================================================================
// Module: Solvereign Error Taxonomy
// Description: Kind-scoped error enums for governance operations plus the HTTP-facing union.
// Purpose: Give every failure a stable error code without leaking internals.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Each governance concern owns a narrow, `thiserror`-derived error enum rather
//! than funneling every failure through one giant type. [`ApiError`] is the
//! union consumed at the HTTP boundary; it carries the taxonomy kind from the
//! specification (AUTH/AUTHZ/STATE/VALIDATION/CONFLICT/GATE/RESOURCE/DEPENDENCY/RATE)
//! alongside a stable `error_code` string and an optional structured detail
//! payload. Handlers never construct raw strings for error codes; they match on
//! `ApiError` variants so the code and the taxonomy kind cannot drift apart.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Taxonomy Kind
// ============================================================================

/// Error taxonomy kind, used to select HTTP status and retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, expired, or revoked session.
    Auth,
    /// Permission denied or tenant mismatch.
    Authz,
    /// Precondition violation (state machine).
    State,
    /// Schema/format/range violation.
    Validation,
    /// Concurrent mutation or duplicate unique key.
    Conflict,
    /// Business gate (violations, approval) refused the action.
    Gate,
    /// Advisory lock busy / worker queue full.
    Resource,
    /// Storage or solver dependency failure.
    Dependency,
    /// Rate limit exhausted.
    Rate,
}

// ============================================================================
// SECTION: API Error
// ============================================================================

/// Union error type returned by every governance operation and translated to
/// an HTTP response at the server boundary.
///
/// # Invariants
/// - `code` is a stable, machine-checkable identifier (e.g. `ALREADY_LOCKED`).
/// - `message` is human-readable but never load-bearing for client logic.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Taxonomy kind.
    pub kind: ErrorKind,
    /// Stable error code string.
    pub code: &'static str,
    /// Human-readable message (not load-bearing for logic).
    pub message: String,
    /// Optional structured detail payload (e.g. violation list).
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Builds an error with no structured detail payload.
    #[must_use]
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches a structured detail payload to the error.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// `401 AUTH_REQUIRED`.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorKind::Auth, "AUTH_REQUIRED", "authentication required")
    }

    /// `403 FORBIDDEN`.
    #[must_use]
    pub fn forbidden(permission: &str) -> Self {
        Self::new(
            ErrorKind::Authz,
            "FORBIDDEN",
            format!("missing permission: {permission}"),
        )
    }

    /// `404 NOT_FOUND`. Used uniformly for missing resources and cross-tenant
    /// reads so existence never leaks across tenant boundaries.
    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::new(ErrorKind::Authz, "NOT_FOUND", format!("{entity} not found"))
    }

    /// `409 ALREADY_LOCKED`.
    #[must_use]
    pub fn already_locked() -> Self {
        Self::new(ErrorKind::State, "ALREADY_LOCKED", "plan is locked")
    }

    /// `403 KILL_SWITCH_ACTIVE`.
    #[must_use]
    pub fn kill_switch_active() -> Self {
        Self::new(
            ErrorKind::State,
            "KILL_SWITCH_ACTIVE",
            "capability disabled by kill switch",
        )
    }

    /// `403 SITE_NOT_ENABLED`.
    #[must_use]
    pub fn site_not_enabled() -> Self {
        Self::new(
            ErrorKind::State,
            "SITE_NOT_ENABLED",
            "site is not enabled for this capability",
        )
    }

    /// `400 REASON_TOO_SHORT`.
    #[must_use]
    pub fn reason_too_short(min_len: usize) -> Self {
        Self::new(
            ErrorKind::Validation,
            "REASON_TOO_SHORT",
            format!("reason must be at least {min_len} characters"),
        )
    }

    /// `400 INPUT_TOO_LARGE`.
    #[must_use]
    pub fn input_too_large(max: usize) -> Self {
        Self::new(
            ErrorKind::Validation,
            "INPUT_TOO_LARGE",
            format!("input exceeds maximum of {max} items"),
        )
    }

    /// `409 VIOLATIONS_BLOCK_PUBLISH`.
    #[must_use]
    pub fn violations_block_publish(details: serde_json::Value) -> Self {
        Self::new(
            ErrorKind::Gate,
            "VIOLATIONS_BLOCK_PUBLISH",
            "publish blocked by outstanding violations",
        )
        .with_details(details)
    }

    /// `403 APPROVAL_REQUIRED`.
    #[must_use]
    pub fn approval_required(required: u8, received: u8) -> Self {
        Self::new(
            ErrorKind::Gate,
            "APPROVAL_REQUIRED",
            format!("{received}/{required} approvals received"),
        )
    }

    /// `409 SESSION_ALREADY_EXISTS`.
    #[must_use]
    pub fn session_already_exists() -> Self {
        Self::new(
            ErrorKind::Conflict,
            "SESSION_ALREADY_EXISTS",
            "an open repair session already exists for this plan",
        )
    }

    /// `404 SESSION_NOT_FOUND`.
    #[must_use]
    pub fn session_not_found() -> Self {
        Self::new(ErrorKind::Authz, "SESSION_NOT_FOUND", "repair session not found")
    }

    /// `410 SESSION_EXPIRED`.
    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(ErrorKind::State, "SESSION_EXPIRED", "repair session has expired")
    }

    /// `409 PREVIEW_STALE`.
    #[must_use]
    pub fn preview_stale() -> Self {
        Self::new(
            ErrorKind::Conflict,
            "PREVIEW_STALE",
            "plan state drifted since preview was computed",
        )
    }

    /// `409 IDEMPOTENCY_CONFLICT`.
    #[must_use]
    pub fn idempotency_conflict() -> Self {
        Self::new(
            ErrorKind::Conflict,
            "IDEMPOTENCY_CONFLICT",
            "idempotency key reused with a different request body",
        )
    }

    /// `503 RESOURCE_BUSY`.
    #[must_use]
    pub fn resource_busy() -> Self {
        Self::new(ErrorKind::Resource, "RESOURCE_BUSY", "advisory lock busy, retry")
    }

    /// `500 INTERNAL`, wrapping a dependency failure without exposing internals.
    #[must_use]
    pub fn internal(context: &str) -> Self {
        Self::new(ErrorKind::Dependency, "INTERNAL", format!("internal error: {context}"))
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use super::ErrorKind;

    #[test]
    fn already_locked_carries_state_kind_and_stable_code() {
        let err = ApiError::already_locked();
        assert_eq!(err.kind, ErrorKind::State);
        assert_eq!(err.code, "ALREADY_LOCKED");
    }

    #[test]
    fn with_details_attaches_payload() {
        let err = ApiError::violations_block_publish(serde_json::json!({"block_count": 3}));
        assert_eq!(err.kind, ErrorKind::Gate);
        assert!(err.details.is_some());
    }
}
