// solvereign-rbac/src/session.rs
// ============================================================================
// Module: Session Lifecycle
// Description: Login, session validation, and permission enforcement.
// Purpose: Implement C2's session contract (spec §4.2): tenant is bound at
//   login and read only from the validated session, never from request
//   headers.
// Dependencies: solvereign-core
// ============================================================================

//! ## Overview
//! [`login`] and [`validate`] are the only two ways a caller obtains a
//! [`SessionContext`]; every other module in the system that needs to know
//! "who is this request from, and what tenant are they scoped to" goes
//! through one of them rather than reading a header or a request body field.
//! [`require_permission`] then gates individual operations against the
//! context's resolved permission set, with a platform-scope bypass mirroring
//! [`solvereign_core::Role::PlatformAdmin`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::RngCore;
use rand::rngs::OsRng;
use solvereign_core::HashAlgorithm;
use solvereign_core::Session;
use solvereign_core::SessionId;
use solvereign_core::SessionStore;
use solvereign_core::SiteId;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::User;
use solvereign_core::UserId;
use solvereign_core::UserStore;
use solvereign_core::hash_bytes;

use crate::AuthError;
use crate::cookie::SESSION_TTL_SECONDS;
use crate::cookie::generate_cookie_value;
use crate::password::verify_password;

// ============================================================================
// SECTION: Session Context
// ============================================================================

/// Resolved identity and scope for an authenticated request.
///
/// Every field here is derived from a validated [`Session`] row and its
/// owning [`User`]; none of it is ever taken from a request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// The authenticated user's id.
    pub user_id: UserId,
    /// The tenant this session is bound to, or `None` for platform scope.
    pub tenant_id: Option<TenantId>,
    /// The site this session is bound to, if any.
    pub site_id: Option<SiteId>,
    /// Whether this session bypasses tenant checks.
    pub is_platform_scope: bool,
    /// The union of permissions across the user's roles.
    pub permissions: Vec<&'static str>,
}

impl SessionContext {
    /// Returns whether this context holds `permission`, honoring the
    /// platform-scope bypass.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_platform_scope || self.permissions.contains(&"*") || self.permissions.contains(&permission)
    }
}

// ============================================================================
// SECTION: Login Outcome
// ============================================================================

/// The result of a successful [`login`] call.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Raw cookie value to set on the client. Never persisted.
    pub cookie_value: String,
    /// The new session's id.
    pub session_id: SessionId,
    /// Seconds the cookie remains valid for, for `Set-Cookie` construction.
    pub ttl_seconds: i64,
}

// ============================================================================
// SECTION: Login
// ============================================================================

/// Authenticates `email`/`password` and issues a new session.
///
/// Tenant and platform scope on the returned session are copied verbatim
/// from the matched [`User`] at the moment of login; they are fixed for the
/// session's lifetime and are never re-derived from a request afterward.
///
/// # Errors
///
/// Returns [`AuthError::Unauthenticated`] for an unknown email or a wrong
/// password, and [`AuthError::Store`] if the user or session store fails.
pub fn login(
    user_store: &dyn UserStore,
    session_store: &dyn SessionStore,
    email: &str,
    password: &str,
    now: Timestamp,
) -> Result<LoginOutcome, AuthError> {
    let normalized_email = email.trim().to_lowercase();
    let user = user_store.get_by_email(&normalized_email)?.ok_or(AuthError::Unauthenticated)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::Unauthenticated);
    }

    let cookie_value = generate_cookie_value();
    let session = Session {
        id: SessionId::new(generate_session_id()),
        user_id: user.id.clone(),
        session_hash: hash_cookie_value(&cookie_value),
        tenant_id: user.tenant_id.clone(),
        site_id: None,
        is_platform_scope: user.is_platform,
        expires_at: now.plus_seconds(SESSION_TTL_SECONDS),
        revoked_at: None,
    };
    session_store.create(&session)?;

    Ok(LoginOutcome { cookie_value, session_id: session.id, ttl_seconds: SESSION_TTL_SECONDS })
}

// ============================================================================
// SECTION: Validate
// ============================================================================

/// Resolves a [`SessionContext`] from a raw cookie value.
///
/// # Errors
///
/// Returns [`AuthError::Unauthenticated`] if the cookie does not match a
/// live session, or if its owning user no longer exists.
pub fn validate(
    user_store: &dyn UserStore,
    session_store: &dyn SessionStore,
    cookie_value: &str,
    now: Timestamp,
) -> Result<SessionContext, AuthError> {
    let session_hash = hash_cookie_value(cookie_value);
    let session = session_store.get_by_hash(&session_hash)?.ok_or(AuthError::Unauthenticated)?;
    if !session.is_live(now) {
        return Err(AuthError::Unauthenticated);
    }
    let user = user_store.get(&session.user_id)?.ok_or(AuthError::Unauthenticated)?;
    Ok(context_for(&session, &user))
}

/// Revokes the session matching `cookie_value`, if one exists.
///
/// # Errors
///
/// Returns [`AuthError::Store`] if the lookup or revoke write fails.
/// Revoking an already-revoked or unknown cookie is a no-op, not an error,
/// so logout remains idempotent.
pub fn logout(session_store: &dyn SessionStore, cookie_value: &str) -> Result<(), AuthError> {
    let session_hash = hash_cookie_value(cookie_value);
    if let Some(session) = session_store.get_by_hash(&session_hash)? {
        if session.revoked_at.is_none() {
            session_store.revoke(&session.id)?;
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Permission Enforcement
// ============================================================================

/// Enforces that `ctx` holds `permission`.
///
/// # Errors
///
/// Returns [`AuthError::Unauthorized`] if the permission is missing. Platform
/// scope (and the `PlatformAdmin` wildcard it implies) always passes.
pub fn require_permission(ctx: &SessionContext, permission: &str) -> Result<(), AuthError> {
    if ctx.has_permission(permission) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized(permission.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a [`SessionContext`] from a live session row and its owning user.
fn context_for(session: &Session, user: &User) -> SessionContext {
    SessionContext {
        user_id: user.id.clone(),
        tenant_id: session.tenant_id.clone(),
        site_id: session.site_id.clone(),
        is_platform_scope: session.is_platform_scope,
        permissions: user.effective_permissions(),
    }
}

/// Hashes a raw cookie value for session-store lookup. The raw value is
/// never itself persisted.
#[must_use]
pub fn hash_cookie_value(cookie_value: &str) -> String {
    hash_bytes(HashAlgorithm::Sha256, cookie_value.as_bytes()).value
}

/// Generates a random, lowercase-hex session row id.
fn generate_session_id() -> String {
    let mut bytes = [0_u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use solvereign_core::Role;
    use solvereign_core::Tenant;
    use solvereign_core::TenantId;
    use solvereign_core::TenantStore;
    use solvereign_core::UserId;
    use solvereign_store_sqlite::SqliteStore;

    use super::context_for;
    use super::hash_cookie_value;
    use super::login;
    use super::logout;
    use super::require_permission;
    use super::validate;
    use crate::AuthError;
    use crate::password::hash_password;

    fn seeded_store() -> (SqliteStore, TenantId) {
        let store = SqliteStore::open_in_memory().expect("in-memory store opens");
        let tenant_id = TenantId::new("acme");
        TenantStore::create(
            &store,
            &Tenant {
                id: tenant_id.clone(),
                code: "ACME".to_string(),
                name: "Acme Logistics".to_string(),
                created_at: solvereign_core::Timestamp::from_unix_seconds(0),
            },
        )
        .expect("tenant creates");
        (store, tenant_id)
    }

    fn seeded_user(tenant_id: &TenantId, roles: Vec<Role>) -> solvereign_core::User {
        solvereign_core::User {
            id: UserId::new("u-dispatcher"),
            email: "dispatcher@acme.test".to_string(),
            password_hash: hash_password("hunter2-hunter2").expect("hash succeeds"),
            tenant_id: Some(tenant_id.clone()),
            is_platform: false,
            roles,
            created_at: solvereign_core::Timestamp::from_unix_seconds(0),
        }
    }

    #[test]
    fn login_then_validate_round_trips_the_session() {
        let (store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        solvereign_core::UserStore::create(&store, &user).expect("user creates");

        let now = solvereign_core::Timestamp::from_unix_seconds(1_000);
        let outcome = login(&store, &store, &user.email, "hunter2-hunter2", now).expect("login succeeds");

        let ctx = validate(&store, &store, &outcome.cookie_value, now).expect("validate succeeds");
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.tenant_id, Some(tenant_id));
        assert!(ctx.has_permission("plan.view"));
        assert!(!ctx.has_permission("plan.publish"));
    }

    #[test]
    fn login_rejects_wrong_password() {
        let (store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        solvereign_core::UserStore::create(&store, &user).expect("user creates");

        let now = solvereign_core::Timestamp::from_unix_seconds(1_000);
        let result = login(&store, &store, &user.email, "wrong password", now);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn validate_rejects_an_expired_session() {
        let (store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        solvereign_core::UserStore::create(&store, &user).expect("user creates");

        let login_time = solvereign_core::Timestamp::from_unix_seconds(0);
        let outcome = login(&store, &store, &user.email, "hunter2-hunter2", login_time).expect("login succeeds");

        let far_future = solvereign_core::Timestamp::from_unix_seconds(1_000_000);
        let result = validate(&store, &store, &outcome.cookie_value, far_future);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn logout_then_validate_fails() {
        let (store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        solvereign_core::UserStore::create(&store, &user).expect("user creates");

        let now = solvereign_core::Timestamp::from_unix_seconds(0);
        let outcome = login(&store, &store, &user.email, "hunter2-hunter2", now).expect("login succeeds");
        logout(&store, &outcome.cookie_value).expect("logout succeeds");

        let result = validate(&store, &store, &outcome.cookie_value, now);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn logout_of_an_unknown_cookie_is_not_an_error() {
        let (store, _tenant_id) = seeded_store();
        logout(&store, "never-issued").expect("logout of unknown cookie is a no-op");
    }

    #[test]
    fn logout_is_idempotent() {
        let (store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        solvereign_core::UserStore::create(&store, &user).expect("user creates");

        let now = solvereign_core::Timestamp::from_unix_seconds(0);
        let outcome = login(&store, &store, &user.email, "hunter2-hunter2", now).expect("login succeeds");
        logout(&store, &outcome.cookie_value).expect("first logout succeeds");
        logout(&store, &outcome.cookie_value).expect("second logout is a no-op, not an error");
    }

    #[test]
    fn require_permission_allows_a_held_permission_and_denies_a_missing_one() {
        let (_store, tenant_id) = seeded_store();
        let user = seeded_user(&tenant_id, vec![Role::Dispatcher]);
        let session = solvereign_core::Session {
            id: solvereign_core::SessionId::new("s1"),
            user_id: user.id.clone(),
            session_hash: hash_cookie_value("irrelevant"),
            tenant_id: Some(tenant_id),
            site_id: None,
            is_platform_scope: false,
            expires_at: solvereign_core::Timestamp::from_unix_seconds(100),
            revoked_at: None,
        };
        let ctx = context_for(&session, &user);

        assert!(require_permission(&ctx, "plan.view").is_ok());
        let err = require_permission(&ctx, "plan.publish").expect_err("dispatcher cannot publish");
        assert!(matches!(err, AuthError::Unauthorized(ref perm) if perm == "plan.publish"));
    }

    #[test]
    fn require_permission_bypasses_for_platform_scope() {
        let user = solvereign_core::User {
            id: UserId::new("u-platform"),
            email: "ops@solvereign.test".to_string(),
            password_hash: hash_password("irrelevant").expect("hash succeeds"),
            tenant_id: None,
            is_platform: true,
            roles: vec![],
            created_at: solvereign_core::Timestamp::from_unix_seconds(0),
        };
        let session = solvereign_core::Session {
            id: solvereign_core::SessionId::new("s2"),
            user_id: user.id.clone(),
            session_hash: hash_cookie_value("irrelevant"),
            tenant_id: None,
            site_id: None,
            is_platform_scope: true,
            expires_at: solvereign_core::Timestamp::from_unix_seconds(100),
            revoked_at: None,
        };
        let ctx = context_for(&session, &user);
        assert!(require_permission(&ctx, "anything.at.all").is_ok());
    }
}
