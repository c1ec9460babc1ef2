// solvereign-server/src/handlers/auth.rs
// ============================================================================
// Module: Auth Handlers
// Description: Login, logout, and session self-description.
// Purpose: Thin HTTP wrapper over solvereign-rbac's login/validate/logout.
// Dependencies: solvereign-rbac, solvereign-core, axum
// ============================================================================

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::header::COOKIE;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorResponse;
use crate::pipeline::AuthenticatedSession;
use crate::pipeline::current_timestamp;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Response body for `POST /auth/login` and `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Authenticated user id.
    pub user_id: String,
    /// Bound tenant, or `None` for platform scope.
    pub tenant_id: Option<String>,
    /// Whether this session is platform-scoped.
    pub is_platform_scope: bool,
    /// The session's resolved permission set.
    pub permissions: Vec<String>,
}

impl From<&solvereign_rbac::SessionContext> for SessionView {
    fn from(context: &solvereign_rbac::SessionContext) -> Self {
        Self {
            user_id: context.user_id.to_string(),
            tenant_id: context.tenant_id.as_ref().map(ToString::to_string),
            is_platform_scope: context.is_platform_scope,
            permissions: context.permissions.iter().map(|permission| (*permission).to_string()).collect(),
        }
    }
}

/// Whether the deployment should issue the `__Host-` prefixed, `Secure`
/// cookie, inferred from whether the server is bound to a loopback address
/// (local development) or a network-reachable one (production).
fn secure_cookie(bind: &str) -> bool {
    bind.parse::<std::net::SocketAddr>().is_ok_and(|addr| !addr.ip().is_loopback())
}

/// `POST /auth/login`.
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` on an unknown email or wrong password.
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    let trace_id = crate::pipeline::generate_trace_id();
    let now = current_timestamp();
    match solvereign_rbac::login(state.store.as_ref(), state.store.as_ref(), &request.email, &request.password, now) {
        Ok(outcome) => {
            let secure = secure_cookie(&state.config.server.bind);
            let cookie = solvereign_rbac::build_set_cookie_header(&outcome.cookie_value, secure, outcome.ttl_seconds);
            state.auth_audit.record(&solvereign_rbac::AuthAuditEvent::allowed(
                "login",
                Some(request.email.clone()),
                None,
            ));
            let mut headers = HeaderMap::new();
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.insert(SET_COOKIE, value);
            }
            (headers, Json(serde_json::json!({"session_id": outcome.session_id.as_str()}))).into_response()
        }
        Err(err) => {
            state.auth_audit.record(&solvereign_rbac::AuthAuditEvent::denied(
                "login",
                Some(request.email.clone()),
                None,
                err.to_string(),
            ));
            ErrorResponse::new(solvereign_core::ApiError::auth_required(), trace_id).into_response()
        }
    }
}

/// `POST /auth/logout`. Always succeeds; revoking an unknown or
/// already-revoked cookie is a no-op.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(cookie_value) = headers.get(COOKIE).and_then(|value| value.to_str().ok()).and_then(extract_cookie) {
        let _ = solvereign_rbac::logout(state.store.as_ref(), &cookie_value);
    }
    let secure = secure_cookie(&state.config.server.bind);
    let clear = solvereign_rbac::build_clear_cookie_header(secure);
    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response_headers.insert(SET_COOKIE, value);
    }
    (response_headers, Json(serde_json::json!({"ok": true}))).into_response()
}

/// `GET /auth/me`.
pub async fn me(session: AuthenticatedSession) -> Json<SessionView> {
    Json(SessionView::from(&session.context))
}

/// Extracts the solvereign session cookie's raw value from a `Cookie` header
/// string, trying both the production and development cookie names.
fn extract_cookie(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == solvereign_rbac::PRODUCTION_COOKIE_NAME || name == solvereign_rbac::DEVELOPMENT_COOKIE_NAME {
            Some(value.to_string())
        } else {
            None
        }
    })
}
