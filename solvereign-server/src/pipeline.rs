// solvereign-server/src/pipeline.rs
// ============================================================================
// Module: Request Pipeline
// Description: Session extraction, permission enforcement, idempotency replay,
//   and advisory-lock wrapping shared by every handler.
// Purpose: Keep handlers down to "extract, call the engine, map the error".
// Dependencies: solvereign-core, solvereign-rbac, solvereign-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! Four concerns recur across every route and are factored out here rather
//! than copied into each handler: resolving the caller's [`SessionContext`]
//! from their cookie ([`AuthenticatedSession`]), replaying a response for a
//! repeated idempotency key ([`with_idempotency`]), serializing a plan's
//! mutating operations through an advisory lock ([`with_plan_lock`]), and
//! minting a per-request trace id ([`generate_trace_id`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::COOKIE;
use rand::RngCore;
use rand::rngs::OsRng;
use solvereign_core::AdvisoryLock;
use solvereign_core::AdvisoryLockStore;
use solvereign_core::ApiError;
use solvereign_core::IdempotencyActionKey;
use solvereign_core::IdempotencyRecord;
use solvereign_core::IdempotencyStore;
use solvereign_core::HashDigest;
use solvereign_core::PlanId;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_rbac::SessionContext;

use crate::error::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Reads the server's wall clock as a [`Timestamp`]. The only place in this
/// crate that calls [`std::time::SystemTime::now`] directly; every
/// `solvereign-core` engine takes `now` as a parameter instead.
#[must_use]
pub fn current_timestamp() -> Timestamp {
    let seconds = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX));
    Timestamp::from_unix_seconds(seconds)
}

// ============================================================================
// SECTION: Trace Id
// ============================================================================

/// Generates a random, lowercase-hex per-request trace id, for cross-
/// referencing a response with the mirrored audit log entry.
#[must_use]
pub fn generate_trace_id() -> String {
    let mut bytes = [0_u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

// ============================================================================
// SECTION: Session Extractor
// ============================================================================

/// An authenticated request's resolved [`SessionContext`] plus its trace id.
///
/// Extracting this from a request runs the full session side of the
/// pipeline: reads the session cookie, hashes it, and resolves it against
/// the store. It does not check any specific permission; handlers call
/// [`AuthenticatedSession::require`] for that once they know which
/// permission the route needs.
pub struct AuthenticatedSession {
    /// The resolved session context, scoped to tenant/site/platform as
    /// recorded at login time.
    pub context: SessionContext,
    /// Trace id minted for this request.
    pub trace_id: String,
}

impl AuthenticatedSession {
    /// Enforces that this session holds `permission`.
    ///
    /// # Errors
    ///
    /// Returns a `FORBIDDEN` [`ErrorResponse`] if the permission is missing.
    pub fn require(&self, permission: &str) -> Result<(), ErrorResponse> {
        solvereign_rbac::require_permission(&self.context, permission)
            .map_err(|_err| self.wrap(ApiError::forbidden(permission)))
    }

    /// Wraps an [`ApiError`] with this request's trace id.
    #[must_use]
    pub fn wrap(&self, error: ApiError) -> ErrorResponse {
        ErrorResponse::new(error, self.trace_id.clone())
    }
}

impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let trace_id = generate_trace_id();
        let wrap = |error: ApiError| ErrorResponse::new(error, trace_id.clone());

        let cookie_value = extract_session_cookie(parts).ok_or_else(|| wrap(ApiError::auth_required()))?;
        let now = current_timestamp();
        let context = solvereign_rbac::validate(state.store.as_ref(), state.store.as_ref(), &cookie_value, now)
            .map_err(|err| wrap(session_error_to_api_error(&err)))?;

        state.auth_audit.record(&solvereign_rbac::AuthAuditEvent::allowed(
            "session_validate",
            Some(context.user_id.to_string()),
            context.tenant_id.as_ref().map(ToString::to_string),
        ));

        Ok(Self { context, trace_id })
    }
}

/// Maps an [`solvereign_rbac::AuthError`] onto this crate's [`ApiError`]
/// taxonomy. `Unauthorized` never reaches here in practice (the extractor
/// only validates, it never checks a specific permission), but is mapped for
/// completeness.
fn session_error_to_api_error(error: &solvereign_rbac::AuthError) -> ApiError {
    match error {
        solvereign_rbac::AuthError::Unauthenticated => ApiError::auth_required(),
        solvereign_rbac::AuthError::Unauthorized(permission) => ApiError::forbidden(permission),
        solvereign_rbac::AuthError::Store(err) => ApiError::internal(&err.to_string()),
        solvereign_rbac::AuthError::Internal(message) => ApiError::internal(message),
    }
}

/// Extracts the session cookie's raw value from the request's `Cookie`
/// header. The server accepts either the production (`__Host-` prefixed) or
/// development cookie name, since both may be present depending on how the
/// deployment terminates TLS; whichever the client actually holds is used.
fn extract_session_cookie(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == solvereign_rbac::PRODUCTION_COOKIE_NAME || name == solvereign_rbac::DEVELOPMENT_COOKIE_NAME {
            Some(value.to_string())
        } else {
            None
        }
    })
}

// ============================================================================
// SECTION: Idempotency
// ============================================================================

/// Runs `execute`, replaying a prior response instead if `action_key` was
/// already seen with a matching request hash, and rejecting with
/// `IDEMPOTENCY_CONFLICT` if the same key carries a different request.
///
/// A request with no `action_key` (the caller sent no `Idempotency-Key`
/// header) simply runs `execute` every time.
///
/// # Errors
///
/// Propagates `execute`'s error, a store failure wrapped as
/// [`ApiError::internal`], or `IDEMPOTENCY_CONFLICT` on a key/hash mismatch.
pub fn with_idempotency<F>(
    store: &dyn IdempotencyStore,
    tenant_id: &TenantId,
    action_key: Option<&IdempotencyActionKey>,
    request_hash: HashDigest,
    now: Timestamp,
    execute: F,
) -> Result<serde_json::Value, ApiError>
where
    F: FnOnce() -> Result<serde_json::Value, ApiError>,
{
    let Some(action_key) = action_key else {
        return execute();
    };

    if let Some(existing) = store
        .get(tenant_id, action_key)
        .map_err(|err| ApiError::internal(&err.to_string()))?
    {
        return if existing.matches(&request_hash) {
            Ok(existing.response_snapshot)
        } else {
            Err(ApiError::idempotency_conflict())
        };
    }

    let response = execute()?;
    let record = IdempotencyRecord {
        tenant_id: tenant_id.clone(),
        action_key: action_key.clone(),
        request_hash,
        response_snapshot: response.clone(),
        created_at: now,
    };
    store.put(&record).map_err(|err| ApiError::internal(&err.to_string()))?;
    Ok(response)
}

// ============================================================================
// SECTION: Advisory Lock
// ============================================================================

/// Lease duration of an acquired advisory lock, independent of how long the
/// caller waited to acquire it.
const LOCK_LEASE_SECONDS: i64 = 30;
/// Delay between acquisition attempts while contended.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `execute` while holding the advisory lock for `plan_id`, retrying
/// acquisition until `deadline` elapses.
///
/// # Errors
///
/// Returns [`ApiError::resource_busy`] if the lock is still held by another
/// request when `deadline` elapses, an [`ApiError::internal`] if the store
/// fails, or `execute`'s own error.
pub async fn with_plan_lock<F, T>(
    store: &dyn AdvisoryLockStore,
    tenant_id: &TenantId,
    plan_id: &PlanId,
    deadline: Duration,
    now: Timestamp,
    execute: F,
) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError>,
{
    let holder_token = generate_trace_id();
    let started = tokio::time::Instant::now();

    loop {
        let lock = AdvisoryLock {
            plan_version_id: plan_id.clone(),
            tenant_id: tenant_id.clone(),
            holder_token: holder_token.clone(),
            acquired_at: now,
            expires_at: now.plus_seconds(LOCK_LEASE_SECONDS),
        };
        let acquired = store.try_acquire(&lock).map_err(|err| ApiError::internal(&err.to_string()))?;
        if acquired {
            break;
        }
        if started.elapsed() >= deadline {
            return Err(ApiError::resource_busy());
        }
        tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
    }

    let result = execute();
    let _ = store.release(tenant_id, plan_id, &holder_token);
    result
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use solvereign_core::IdempotencyActionKey;
    use solvereign_core::HashAlgorithm;
    use solvereign_core::PlanId;
    use solvereign_core::TenantId;
    use solvereign_core::Timestamp;
    use solvereign_core::hash_bytes;
    use solvereign_store_sqlite::SqliteStore;

    use super::generate_trace_id;
    use super::with_idempotency;
    use super::with_plan_lock;

    #[test]
    fn trace_ids_are_distinct_and_non_empty() {
        let a = generate_trace_id();
        let b = generate_trace_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn idempotency_replays_a_matching_request_without_rerunning() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tenant_id = TenantId::new("t1");
        let key = IdempotencyActionKey::new("plan-create-1");
        let hash = hash_bytes(HashAlgorithm::Sha256, b"payload");
        let now = Timestamp::from_unix_seconds(0);

        let mut calls = 0;
        let first = with_idempotency(&store, &tenant_id, Some(&key), hash.clone(), now, || {
            calls += 1;
            Ok(serde_json::json!({"ok": true}))
        })
        .unwrap();
        assert_eq!(first, serde_json::json!({"ok": true}));

        let second = with_idempotency(&store, &tenant_id, Some(&key), hash, now, || {
            calls += 1;
            Ok(serde_json::json!({"ok": true}))
        })
        .unwrap();
        assert_eq!(second, serde_json::json!({"ok": true}));
        assert_eq!(calls, 1);
    }

    #[test]
    fn idempotency_rejects_a_reused_key_with_a_different_request() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tenant_id = TenantId::new("t1");
        let key = IdempotencyActionKey::new("plan-create-1");
        let now = Timestamp::from_unix_seconds(0);

        with_idempotency(
            &store,
            &tenant_id,
            Some(&key),
            hash_bytes(HashAlgorithm::Sha256, b"payload-a"),
            now,
            || Ok(serde_json::json!({"ok": true})),
        )
        .unwrap();

        let result = with_idempotency(
            &store,
            &tenant_id,
            Some(&key),
            hash_bytes(HashAlgorithm::Sha256, b"payload-b"),
            now,
            || Ok(serde_json::json!({"ok": true})),
        );
        assert_eq!(result.unwrap_err().code, "IDEMPOTENCY_CONFLICT");
    }

    #[tokio::test]
    async fn plan_lock_serializes_concurrent_callers_and_releases_on_completion() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tenant_id = TenantId::new("t1");
        let plan_id = PlanId::new("p1");
        let now = Timestamp::from_unix_seconds(0);

        let first = with_plan_lock(&store, &tenant_id, &plan_id, std::time::Duration::from_millis(200), now, || {
            Ok::<_, solvereign_core::ApiError>(1)
        })
        .await
        .unwrap();
        assert_eq!(first, 1);

        let second = with_plan_lock(&store, &tenant_id, &plan_id, std::time::Duration::from_millis(200), now, || {
            Ok::<_, solvereign_core::ApiError>(2)
        })
        .await
        .unwrap();
        assert_eq!(second, 2);
    }
}
