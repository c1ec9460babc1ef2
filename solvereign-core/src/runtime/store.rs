// solvereign-core/src/runtime/store.rs
// ============================================================================
// Module: Solvereign In-Memory Store
// Description: Simple in-memory implementations of every store trait, for tests.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of every store trait in
//! [`crate::interfaces`] for tests and local demos. It is not intended for
//! production use; `solvereign-store-sqlite` is the production implementation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::AdvisoryLock;
use crate::core::ApprovalRequest;
use crate::core::ApprovalRequestId;
use crate::core::AuditEvent;
use crate::core::ExternalMapping;
use crate::core::ExternalMappingId;
use crate::core::GENESIS_HASH;
use crate::core::HashAlgorithm;
use crate::core::HashDigest;
use crate::core::IdempotencyActionKey;
use crate::core::IdempotencyRecord;
use crate::core::Pin;
use crate::core::PinId;
use crate::core::PlanId;
use crate::core::PlanVersion;
use crate::core::RepairSession;
use crate::core::RepairSessionId;
use crate::core::Session;
use crate::core::SessionId;
use crate::core::Site;
use crate::core::SiteId;
use crate::core::Snapshot;
use crate::core::SnapshotId;
use crate::core::SnapshotStatus;
use crate::core::Tenant;
use crate::core::TenantId;
use crate::core::User;
use crate::core::UserId;
use crate::core::ViolationsCache;
use crate::interfaces::AdvisoryLockStore;
use crate::interfaces::ApprovalRequestStore;
use crate::interfaces::AuditLogStore;
use crate::interfaces::ExternalMappingStore;
use crate::interfaces::IdempotencyStore;
use crate::interfaces::KillSwitchStore;
use crate::interfaces::PinStore;
use crate::interfaces::PlanStore;
use crate::interfaces::RepairSessionStore;
use crate::interfaces::SessionStore;
use crate::interfaces::SiteStore;
use crate::interfaces::SnapshotStore;
use crate::interfaces::StoreError;
use crate::interfaces::TenantStore;
use crate::interfaces::UserStore;
use crate::interfaces::ViolationsCacheStore;

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{what} mutex poisoned"))
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory implementation of every store trait, for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tenants: Arc<Mutex<BTreeMap<String, Tenant>>>,
    sites: Arc<Mutex<BTreeMap<(String, String), Site>>>,
    users: Arc<Mutex<BTreeMap<String, User>>>,
    users_by_email: Arc<Mutex<BTreeMap<String, String>>>,
    sessions: Arc<Mutex<BTreeMap<String, Session>>>,
    external_mappings: Arc<Mutex<BTreeMap<String, ExternalMapping>>>,
    plans: Arc<Mutex<BTreeMap<(String, String), PlanVersion>>>,
    snapshots: Arc<Mutex<BTreeMap<(String, String), Snapshot>>>,
    pins: Arc<Mutex<BTreeMap<(String, String), Pin>>>,
    repair_sessions: Arc<Mutex<BTreeMap<(String, String), RepairSession>>>,
    violations_cache: Arc<Mutex<BTreeMap<(String, String), ViolationsCache>>>,
    approval_requests: Arc<Mutex<BTreeMap<(String, String), ApprovalRequest>>>,
    audit_log: Arc<Mutex<BTreeMap<String, Vec<AuditEvent>>>>,
    idempotency: Arc<Mutex<BTreeMap<(String, String), IdempotencyRecord>>>,
    advisory_locks: Arc<Mutex<BTreeMap<(String, String), AdvisoryLock>>>,
    kill_switches: Arc<Mutex<BTreeMap<(String, String, String), bool>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// SECTION: Identity & Tenant
// ============================================================================

impl TenantStore for InMemoryStore {
    fn create(&self, tenant: &Tenant) -> Result<(), StoreError> {
        let mut guard = self.tenants.lock().map_err(|_| poisoned("tenant store"))?;
        if guard.contains_key(tenant.id.as_str()) {
            return Err(StoreError::Conflict(format!("tenant {} exists", tenant.id)));
        }
        guard.insert(tenant.id.as_str().to_string(), tenant.clone());
        Ok(())
    }

    fn get(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        let guard = self.tenants.lock().map_err(|_| poisoned("tenant store"))?;
        Ok(guard.get(id.as_str()).cloned())
    }
}

impl SiteStore for InMemoryStore {
    fn create(&self, site: &Site) -> Result<(), StoreError> {
        let mut guard = self.sites.lock().map_err(|_| poisoned("site store"))?;
        let key = (site.tenant_id.as_str().to_string(), site.id.as_str().to_string());
        if guard.contains_key(&key) {
            return Err(StoreError::Conflict(format!("site {} exists", site.id)));
        }
        guard.insert(key, site.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &SiteId) -> Result<Option<Site>, StoreError> {
        let guard = self.sites.lock().map_err(|_| poisoned("site store"))?;
        Ok(guard.get(&(tenant_id.as_str().to_string(), id.as_str().to_string())).cloned())
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<Site>, StoreError> {
        let guard = self.sites.lock().map_err(|_| poisoned("site store"))?;
        Ok(guard.values().filter(|s| &s.tenant_id == tenant_id).cloned().collect())
    }

    fn set_publish_enabled(&self, tenant_id: &TenantId, id: &SiteId, enabled: bool) -> Result<(), StoreError> {
        let mut guard = self.sites.lock().map_err(|_| poisoned("site store"))?;
        let key = (tenant_id.as_str().to_string(), id.as_str().to_string());
        let site = guard.get_mut(&key).ok_or_else(|| StoreError::Backend(format!("site {id} unknown")))?;
        site.publish_enabled = enabled;
        Ok(())
    }
}

impl UserStore for InMemoryStore {
    fn create(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().map_err(|_| poisoned("user store"))?;
        let mut by_email = self.users_by_email.lock().map_err(|_| poisoned("user store"))?;
        if by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        by_email.insert(user.email.clone(), user.id.as_str().to_string());
        users.insert(user.id.as_str().to_string(), user.clone());
        Ok(())
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let guard = self.users.lock().map_err(|_| poisoned("user store"))?;
        Ok(guard.get(id.as_str()).cloned())
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let by_email = self.users_by_email.lock().map_err(|_| poisoned("user store"))?;
        let Some(id) = by_email.get(email) else { return Ok(None) };
        let users = self.users.lock().map_err(|_| poisoned("user store"))?;
        Ok(users.get(id).cloned())
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

impl SessionStore for InMemoryStore {
    fn create(&self, session: &Session) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().map_err(|_| poisoned("session store"))?;
        guard.insert(session.session_hash.clone(), session.clone());
        Ok(())
    }

    fn get_by_hash(&self, session_hash: &str) -> Result<Option<Session>, StoreError> {
        let guard = self.sessions.lock().map_err(|_| poisoned("session store"))?;
        Ok(guard.get(session_hash).cloned())
    }

    fn revoke(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().map_err(|_| poisoned("session store"))?;
        let session = guard
            .values_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StoreError::Backend(format!("session {id} unknown")))?;
        session.revoked_at = Some(session.expires_at);
        Ok(())
    }
}

// ============================================================================
// SECTION: External Mapping
// ============================================================================

impl ExternalMappingStore for InMemoryStore {
    fn find(
        &self,
        tenant_id: &TenantId,
        external_system: &str,
        entity_type: &str,
        external_id: &str,
    ) -> Result<Option<ExternalMapping>, StoreError> {
        let guard = self.external_mappings.lock().map_err(|_| poisoned("external mapping store"))?;
        Ok(guard
            .values()
            .find(|m| {
                &m.tenant_id == tenant_id
                    && m.external_system == external_system
                    && m.entity_type == entity_type
                    && m.external_id == external_id
            })
            .cloned())
    }

    fn create(&self, mapping: &ExternalMapping) -> Result<(), StoreError> {
        let mut guard = self.external_mappings.lock().map_err(|_| poisoned("external mapping store"))?;
        guard.insert(mapping.id.as_str().to_string(), mapping.clone());
        Ok(())
    }

    fn deprecate(&self, id: &ExternalMappingId) -> Result<(), StoreError> {
        let mut guard = self.external_mappings.lock().map_err(|_| poisoned("external mapping store"))?;
        let mapping = guard
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::Backend(format!("mapping {id} unknown")))?;
        mapping.sync_status = crate::core::MappingSyncStatus::Deprecated;
        Ok(())
    }
}

// ============================================================================
// SECTION: Plan, Snapshot, Pin
// ============================================================================

impl PlanStore for InMemoryStore {
    fn create(&self, plan: &PlanVersion) -> Result<(), StoreError> {
        let mut guard = self.plans.lock().map_err(|_| poisoned("plan store"))?;
        let key = (plan.tenant_id.as_str().to_string(), plan.id.as_str().to_string());
        guard.insert(key, plan.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &PlanId) -> Result<Option<PlanVersion>, StoreError> {
        let guard = self.plans.lock().map_err(|_| poisoned("plan store"))?;
        Ok(guard.get(&(tenant_id.as_str().to_string(), id.as_str().to_string())).cloned())
    }

    fn update(&self, plan: &PlanVersion) -> Result<(), StoreError> {
        self.create(plan)
    }

    fn list_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<PlanVersion>, StoreError> {
        let guard = self.plans.lock().map_err(|_| poisoned("plan store"))?;
        let mut out: Vec<PlanVersion> = guard.values().filter(|plan| &plan.tenant_id == tenant_id).cloned().collect();
        out.sort_by_key(|plan| std::cmp::Reverse(plan.created_at.unix_seconds()));
        Ok(out)
    }

    fn exists_for_other_tenant(&self, tenant_id: &TenantId, id: &PlanId) -> Result<bool, StoreError> {
        let guard = self.plans.lock().map_err(|_| poisoned("plan store"))?;
        Ok(guard.values().any(|plan| &plan.id == id && &plan.tenant_id != tenant_id))
    }
}

impl SnapshotStore for InMemoryStore {
    fn create(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().map_err(|_| poisoned("snapshot store"))?;
        let key = (snapshot.tenant_id.as_str().to_string(), snapshot.id.as_str().to_string());
        guard.insert(key, snapshot.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &SnapshotId) -> Result<Option<Snapshot>, StoreError> {
        let guard = self.snapshots.lock().map_err(|_| poisoned("snapshot store"))?;
        Ok(guard.get(&(tenant_id.as_str().to_string(), id.as_str().to_string())).cloned())
    }

    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Snapshot>, StoreError> {
        let guard = self.snapshots.lock().map_err(|_| poisoned("snapshot store"))?;
        let mut out: Vec<Snapshot> = guard
            .values()
            .filter(|s| &s.tenant_id == tenant_id && &s.plan_version_id == plan_version_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.version_number);
        Ok(out)
    }

    fn update_status(&self, tenant_id: &TenantId, id: &SnapshotId, status: SnapshotStatus) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().map_err(|_| poisoned("snapshot store"))?;
        let snapshot = guard
            .get_mut(&(tenant_id.as_str().to_string(), id.as_str().to_string()))
            .ok_or_else(|| StoreError::Backend(format!("snapshot {id} unknown")))?;
        snapshot.snapshot_status = status;
        Ok(())
    }
}

impl PinStore for InMemoryStore {
    fn create(&self, pin: &Pin) -> Result<(), StoreError> {
        let mut guard = self.pins.lock().map_err(|_| poisoned("pin store"))?;
        let key = (pin.tenant_id.as_str().to_string(), pin.id.as_str().to_string());
        guard.insert(key, pin.clone());
        Ok(())
    }

    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Pin>, StoreError> {
        let guard = self.pins.lock().map_err(|_| poisoned("pin store"))?;
        Ok(guard
            .values()
            .filter(|p| &p.tenant_id == tenant_id && &p.plan_version_id == plan_version_id)
            .cloned()
            .collect())
    }

    fn delete(&self, tenant_id: &TenantId, id: &PinId) -> Result<(), StoreError> {
        let mut guard = self.pins.lock().map_err(|_| poisoned("pin store"))?;
        guard
            .remove(&(tenant_id.as_str().to_string(), id.as_str().to_string()))
            .ok_or_else(|| StoreError::Backend(format!("pin {id} unknown")))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Repair Session
// ============================================================================

impl RepairSessionStore for InMemoryStore {
    fn create(&self, session: &RepairSession) -> Result<(), StoreError> {
        let mut guard = self.repair_sessions.lock().map_err(|_| poisoned("repair session store"))?;
        let has_open = guard.values().any(|s| {
            s.tenant_id == session.tenant_id
                && s.plan_version_id == session.plan_version_id
                && s.status == crate::core::RepairStatus::Open
        });
        if has_open {
            return Err(StoreError::Conflict(format!(
                "an open repair session already exists for plan {}",
                session.plan_version_id
            )));
        }
        let key = (session.tenant_id.as_str().to_string(), session.id.as_str().to_string());
        guard.insert(key, session.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &RepairSessionId) -> Result<Option<RepairSession>, StoreError> {
        let guard = self.repair_sessions.lock().map_err(|_| poisoned("repair session store"))?;
        Ok(guard.get(&(tenant_id.as_str().to_string(), id.as_str().to_string())).cloned())
    }

    fn find_open_for_plan(
        &self,
        tenant_id: &TenantId,
        plan_version_id: &PlanId,
    ) -> Result<Option<RepairSession>, StoreError> {
        let guard = self.repair_sessions.lock().map_err(|_| poisoned("repair session store"))?;
        Ok(guard
            .values()
            .find(|s| {
                &s.tenant_id == tenant_id
                    && &s.plan_version_id == plan_version_id
                    && s.status == crate::core::RepairStatus::Open
            })
            .cloned())
    }

    fn update(&self, session: &RepairSession) -> Result<(), StoreError> {
        let mut guard = self.repair_sessions.lock().map_err(|_| poisoned("repair session store"))?;
        let key = (session.tenant_id.as_str().to_string(), session.id.as_str().to_string());
        guard.insert(key, session.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Violations Cache
// ============================================================================

impl ViolationsCacheStore for InMemoryStore {
    fn put(&self, cache: &ViolationsCache) -> Result<(), StoreError> {
        let mut guard = self.violations_cache.lock().map_err(|_| poisoned("violations cache store"))?;
        let key = (cache.tenant_id.as_str().to_string(), cache.plan_version_id.as_str().to_string());
        guard.insert(key, cache.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Option<ViolationsCache>, StoreError> {
        let guard = self.violations_cache.lock().map_err(|_| poisoned("violations cache store"))?;
        Ok(guard
            .get(&(tenant_id.as_str().to_string(), plan_version_id.as_str().to_string()))
            .cloned())
    }
}

// ============================================================================
// SECTION: Approval Request
// ============================================================================

impl ApprovalRequestStore for InMemoryStore {
    fn create(&self, request: &ApprovalRequest) -> Result<(), StoreError> {
        let mut guard = self.approval_requests.lock().map_err(|_| poisoned("approval request store"))?;
        let key = (request.tenant_id.as_str().to_string(), request.id.as_str().to_string());
        guard.insert(key, request.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &ApprovalRequestId) -> Result<Option<ApprovalRequest>, StoreError> {
        let guard = self.approval_requests.lock().map_err(|_| poisoned("approval request store"))?;
        Ok(guard.get(&(tenant_id.as_str().to_string(), id.as_str().to_string())).cloned())
    }

    fn update(&self, request: &ApprovalRequest) -> Result<(), StoreError> {
        self.create(request)
    }
}

// ============================================================================
// SECTION: Audit Log
// ============================================================================

impl AuditLogStore for InMemoryStore {
    fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
        let mut guard = self.audit_log.lock().map_err(|_| poisoned("audit log store"))?;
        let events = guard.entry(event.tenant_id.as_str().to_string()).or_default();
        let expected_sequence = events.last().map_or(1, |e| e.sequence + 1);
        if event.sequence != expected_sequence {
            return Err(StoreError::Conflict(format!(
                "expected sequence {expected_sequence}, got {}",
                event.sequence
            )));
        }
        events.push(event.clone());
        Ok(())
    }

    fn latest_entry_hash(&self, tenant_id: &TenantId) -> Result<HashDigest, StoreError> {
        let guard = self.audit_log.lock().map_err(|_| poisoned("audit log store"))?;
        Ok(guard
            .get(tenant_id.as_str())
            .and_then(|events| events.last())
            .map_or_else(
                || HashDigest {
                    algorithm: HashAlgorithm::Sha256,
                    value: GENESIS_HASH.to_string(),
                },
                |event| event.entry_hash.clone(),
            ))
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<AuditEvent>, StoreError> {
        let guard = self.audit_log.lock().map_err(|_| poisoned("audit log store"))?;
        Ok(guard.get(tenant_id.as_str()).cloned().unwrap_or_default())
    }
}

// ============================================================================
// SECTION: Idempotency & Advisory Lock
// ============================================================================

impl IdempotencyStore for InMemoryStore {
    fn get(&self, tenant_id: &TenantId, action_key: &IdempotencyActionKey) -> Result<Option<IdempotencyRecord>, StoreError> {
        let guard = self.idempotency.lock().map_err(|_| poisoned("idempotency store"))?;
        Ok(guard
            .get(&(tenant_id.as_str().to_string(), action_key.as_str().to_string()))
            .cloned())
    }

    fn put(&self, record: &IdempotencyRecord) -> Result<(), StoreError> {
        let mut guard = self.idempotency.lock().map_err(|_| poisoned("idempotency store"))?;
        let key = (record.tenant_id.as_str().to_string(), record.action_key.as_str().to_string());
        if guard.contains_key(&key) {
            return Err(StoreError::Conflict(format!("idempotency key {} already recorded", record.action_key)));
        }
        guard.insert(key, record.clone());
        Ok(())
    }
}

impl AdvisoryLockStore for InMemoryStore {
    fn try_acquire(&self, lock: &AdvisoryLock) -> Result<bool, StoreError> {
        let mut guard = self.advisory_locks.lock().map_err(|_| poisoned("advisory lock store"))?;
        let key = (lock.tenant_id.as_str().to_string(), lock.plan_version_id.as_str().to_string());
        if let Some(existing) = guard.get(&key) {
            if existing.is_held(lock.acquired_at) && existing.holder_token != lock.holder_token {
                return Ok(false);
            }
        }
        guard.insert(key, lock.clone());
        Ok(true)
    }

    fn release(&self, tenant_id: &TenantId, plan_version_id: &PlanId, holder_token: &str) -> Result<(), StoreError> {
        let mut guard = self.advisory_locks.lock().map_err(|_| poisoned("advisory lock store"))?;
        let key = (tenant_id.as_str().to_string(), plan_version_id.as_str().to_string());
        if let Some(existing) = guard.get(&key) {
            if existing.holder_token == holder_token {
                guard.remove(&key);
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Kill Switch
// ============================================================================

impl KillSwitchStore for InMemoryStore {
    fn is_enabled(&self, tenant_id: &TenantId, site_id: &SiteId, capability: &str) -> Result<bool, StoreError> {
        let guard = self.kill_switches.lock().map_err(|_| poisoned("kill switch store"))?;
        Ok(guard
            .get(&(tenant_id.as_str().to_string(), site_id.as_str().to_string(), capability.to_string()))
            .copied()
            .unwrap_or(true))
    }

    fn set_enabled(&self, tenant_id: &TenantId, site_id: &SiteId, capability: &str, enabled: bool) -> Result<(), StoreError> {
        let mut guard = self.kill_switches.lock().map_err(|_| poisoned("kill switch store"))?;
        guard.insert(
            (tenant_id.as_str().to_string(), site_id.as_str().to_string(), capability.to_string()),
            enabled,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryStore;
    use crate::core::Tenant;
    use crate::core::TenantId;
    use crate::core::Timestamp;
    use crate::interfaces::TenantStore;

    #[test]
    fn duplicate_tenant_create_is_a_conflict() {
        let store = InMemoryStore::new();
        let tenant = Tenant {
            id: TenantId::new("t1"),
            code: "ACME".to_string(),
            name: "Acme Logistics".to_string(),
            created_at: Timestamp::from_unix_seconds(0),
        };
        store.create(&tenant).unwrap();
        assert!(store.create(&tenant).is_err());
    }

    #[test]
    fn get_missing_tenant_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.get(&TenantId::new("missing")).unwrap().is_none());
    }
}
