// solvereign-server/src/error.rs
// ============================================================================
// Module: HTTP Error Mapping
// Description: Translates solvereign_core::ApiError into a JSON HTTP response.
// Purpose: Keep every handler's error path to a single `?`, per C12's
//   uniform `{error_code, message, trace_id, details?}` error body.
// Dependencies: solvereign-core, axum, serde
// ============================================================================

//! ## Overview
//! Handlers return `Result<T, ApiError>`; [`ErrorResponse`] wraps the error
//! with the request's `trace_id` and implements [`IntoResponse`] so a bare
//! `?` in a handler produces the correct status and body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use solvereign_core::ApiError;

// ============================================================================
// SECTION: Error Response
// ============================================================================

/// JSON error body returned by every failing request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable, machine-checkable error code.
    pub error_code: &'static str,
    /// Human-readable message, not load-bearing for client logic.
    pub message: String,
    /// Per-request trace identifier, for cross-referencing with the audit log.
    pub trace_id: String,
    /// Optional structured detail payload (e.g. violation list).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Wraps `error` with `trace_id` for the response body.
    #[must_use]
    pub fn new(error: ApiError, trace_id: String) -> Self {
        Self {
            error_code: error.code,
            message: error.message,
            trace_id,
            details: error.details,
        }
    }

    /// Resolves the HTTP status for this response's error code.
    #[must_use]
    fn status(&self) -> StatusCode {
        status_for_code(self.error_code)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}

/// Resolves the HTTP status for a stable error code. `NOT_FOUND` and
/// `SESSION_NOT_FOUND` both carry `ApiError`'s `Authz` kind but are `404`s,
/// not `403`s, so the mapping is keyed on the code string rather than the
/// taxonomy kind. An unrecognized code maps to `500`.
#[must_use]
fn status_for_code(code: &str) -> StatusCode {
    match code {
        "AUTH_REQUIRED" => StatusCode::UNAUTHORIZED,
        "FORBIDDEN" | "KILL_SWITCH_ACTIVE" | "SITE_NOT_ENABLED" | "APPROVAL_REQUIRED" => StatusCode::FORBIDDEN,
        "NOT_FOUND" | "SESSION_NOT_FOUND" => StatusCode::NOT_FOUND,
        "REASON_TOO_SHORT" | "INPUT_TOO_LARGE" => StatusCode::BAD_REQUEST,
        "ALREADY_LOCKED"
        | "VIOLATIONS_BLOCK_PUBLISH"
        | "SESSION_ALREADY_EXISTS"
        | "PREVIEW_STALE"
        | "IDEMPOTENCY_CONFLICT"
        | "INVALID_STATE_TRANSITION"
        | "FREEZE_WINDOW_ACTIVE"
        | "SESSION_NOT_OPEN"
        | "SESSION_NOT_APPLIED" => StatusCode::CONFLICT,
        "SESSION_EXPIRED" => StatusCode::GONE,
        "RESOURCE_BUSY" => StatusCode::SERVICE_UNAVAILABLE,
        "INTERNAL" => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
