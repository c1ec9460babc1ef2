// solvereign-core/src/core/tenancy.rs
// ============================================================================
// Module: Solvereign Identity & Tenant Model
// Description: Tenants, sites, users, the role/permission catalog, sessions, and external mappings.
// Purpose: Canonical types underlying C1 (Identity & Tenant Store) and C2 (Session & RBAC).
// Dependencies: serde, crate::core::identifiers, crate::core::time
// ============================================================================

//! ## Overview
//! Tenants own every other scoped entity in the system. A [`User`] is either
//! tenant-scoped or platform-scope; the two `tenant_id`/`is_platform` fields
//! are constrained together (see [`User::is_consistent`]). Roles map to a
//! fixed permission set resolved by [`Role::permissions`]; the catalog is
//! immutable at runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ExternalMappingId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::SiteId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Tenant & Site
// ============================================================================

/// Canonical tenant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Short, unique tenant code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

/// Depot/location within a tenant.
///
/// # Invariants
/// - `(tenant_id, site_code)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site identifier.
    pub id: SiteId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Site code, unique within the tenant.
    pub site_code: String,
    /// Display name.
    pub name: String,
    /// Whether publish is enabled for this site.
    pub publish_enabled: bool,
}

// ============================================================================
// SECTION: Role & Permission Catalog
// ============================================================================

/// Seeded role catalog. Role→permission mapping is immutable at runtime
/// except via migration (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Bypasses all permission checks; platform scope only.
    PlatformAdmin,
    /// Full administrative rights within a tenant.
    TenantAdmin,
    /// Canonical approver role; carries `plan.publish`/`plan.approve` (see DESIGN.md).
    OperatorAdmin,
    /// Day-to-day plan operations; no publish/approve rights.
    Dispatcher,
    /// Read-only access within a tenant.
    OpsReadonly,
}

impl Role {
    /// Returns the fixed permission set for this role.
    #[must_use]
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Self::PlatformAdmin => &["*"],
            Self::TenantAdmin => &[
                "plan.view",
                "plan.create",
                "plan.solve",
                "plan.publish",
                "plan.approve",
                "plan.lock",
                "plan.repair",
                "plan.pin",
                "portal.approve.write",
                "kill_switch.manage",
                "audit.view",
                "approval.manage",
                "approval.override",
            ],
            Self::OperatorAdmin => &[
                "plan.view",
                "plan.create",
                "plan.solve",
                "plan.publish",
                "plan.approve",
                "plan.lock",
                "plan.repair",
                "plan.pin",
                "portal.approve.write",
                "audit.view",
                "approval.manage",
            ],
            Self::Dispatcher => &["plan.view", "plan.create", "plan.solve", "plan.repair", "plan.pin"],
            Self::OpsReadonly => &["plan.view"],
        }
    }

    /// Returns whether this role holds `permission`, honoring the
    /// platform-admin wildcard.
    #[must_use]
    pub fn has_permission(self, permission: &str) -> bool {
        let perms = self.permissions();
        perms.contains(&"*") || perms.contains(&permission)
    }
}

// ============================================================================
// SECTION: User
// ============================================================================

/// Authenticatable principal.
///
/// # Invariants
/// - `tenant_id.is_none() == is_platform` must always hold ([`User::is_consistent`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Case-folded, normalized email address.
    pub email: String,
    /// Argon2id password hash (PHC string format).
    pub password_hash: String,
    /// Owning tenant, or `None` for platform-scope users.
    pub tenant_id: Option<TenantId>,
    /// Whether this user bypasses tenant checks.
    pub is_platform: bool,
    /// Roles held by this user.
    pub roles: Vec<Role>,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl User {
    /// Returns whether `tenant_id` and `is_platform` agree, per the data
    /// model's invariant for platform-scope users.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.tenant_id.is_none() == self.is_platform
    }

    /// Returns the union of permissions across all roles held by this user.
    #[must_use]
    pub fn effective_permissions(&self) -> Vec<&'static str> {
        let mut perms: Vec<&'static str> =
            self.roles.iter().flat_map(|role| role.permissions().iter().copied()).collect();
        perms.sort_unstable();
        perms.dedup();
        perms
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Session lookup row. Lookup is always by `session_hash`; the raw cookie
/// value is never stored.
///
/// # Invariants
/// - `session_hash` is unique.
/// - Expired or revoked sessions never authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// SHA-256 hex digest of the cookie value.
    pub session_hash: String,
    /// Bound tenant, or `None` for platform scope.
    pub tenant_id: Option<TenantId>,
    /// Bound site, if any.
    pub site_id: Option<SiteId>,
    /// Whether this session is platform scope.
    pub is_platform_scope: bool,
    /// Expiry timestamp.
    pub expires_at: Timestamp,
    /// Revocation timestamp, if revoked.
    pub revoked_at: Option<Timestamp>,
}

impl Session {
    /// Returns whether the session authenticates at `now`.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

// ============================================================================
// SECTION: External Mapping
// ============================================================================

/// `(tenant, external_system, entity_type, external_id) → internal_uuid` row.
///
/// # Invariants
/// - The 4-tuple `(tenant_id, external_system, entity_type, external_id)` is unique.
/// - Deprecated rows use `sync_status = Deprecated` and are never physically deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMapping {
    /// Row identifier.
    pub id: ExternalMappingId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// External system name (e.g. `"fls"`).
    pub external_system: String,
    /// Entity type (e.g. `"driver"`, `"tour"`).
    pub entity_type: String,
    /// External identifier within `external_system`.
    pub external_id: String,
    /// Resolved internal identifier.
    pub internal_id: String,
    /// Sync status.
    pub sync_status: MappingSyncStatus,
}

/// Sync status for an [`ExternalMapping`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSyncStatus {
    /// Mapping is active and authoritative.
    Active,
    /// Mapping is retained for history but no longer authoritative.
    Deprecated,
}

#[cfg(test)]
mod tests {
    use super::Role;
    use super::User;
    use crate::core::identifiers::TenantId;
    use crate::core::identifiers::UserId;
    use crate::core::time::Timestamp;

    fn sample_user(tenant_id: Option<TenantId>, is_platform: bool, roles: Vec<Role>) -> User {
        User {
            id: UserId::new("u1"),
            email: "ops@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            tenant_id,
            is_platform,
            roles,
            created_at: Timestamp::from_unix_seconds(0),
        }
    }

    #[test]
    fn platform_admin_bypasses_permission_checks() {
        assert!(Role::PlatformAdmin.has_permission("plan.publish"));
        assert!(Role::PlatformAdmin.has_permission("anything.at.all"));
    }

    #[test]
    fn operator_admin_carries_publish_and_approve() {
        assert!(Role::OperatorAdmin.has_permission("plan.publish"));
        assert!(Role::OperatorAdmin.has_permission("plan.approve"));
        assert!(!Role::Dispatcher.has_permission("plan.publish"));
    }

    #[test]
    fn tenant_scoped_user_is_consistent() {
        let user = sample_user(Some(TenantId::new("t1")), false, vec![Role::Dispatcher]);
        assert!(user.is_consistent());
    }

    #[test]
    fn platform_user_without_tenant_is_consistent() {
        let user = sample_user(None, true, vec![Role::PlatformAdmin]);
        assert!(user.is_consistent());
    }

    #[test]
    fn mismatched_tenant_and_platform_flag_is_inconsistent() {
        let user = sample_user(Some(TenantId::new("t1")), true, vec![Role::Dispatcher]);
        assert!(!user.is_consistent());
    }

    #[test]
    fn effective_permissions_dedupes_across_roles() {
        let user = sample_user(Some(TenantId::new("t1")), false, vec![Role::Dispatcher, Role::OpsReadonly]);
        let perms = user.effective_permissions();
        assert_eq!(perms.iter().filter(|p| **p == "plan.view").count(), 1);
    }
}
