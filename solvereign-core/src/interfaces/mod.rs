// solvereign-core/src/interfaces/mod.rs
// ============================================================================
// Module: Solvereign Store Interfaces
// Description: Backend-agnostic persistence contracts for every governance aggregate.
// Purpose: Define the trait surfaces the runtime engines depend on, implemented by C14.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Solvereign persists state without embedding a
//! specific backend. Implementations must be deterministic and fail closed
//! on missing or invalid data; `solvereign-store-sqlite` is the production
//! implementation, while `runtime::store` provides in-memory implementations
//! for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AdvisoryLock;
use crate::core::ApprovalRequest;
use crate::core::ApprovalRequestId;
use crate::core::AuditEvent;
use crate::core::ExternalMapping;
use crate::core::ExternalMappingId;
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
use crate::core::Tenant;
use crate::core::TenantId;
use crate::core::User;
use crate::core::UserId;
use crate::core::ViolationsCache;

// ============================================================================
// SECTION: Solver Gateway (C15)
// ============================================================================

/// Outcome of a solve invocation, common to every [`PlanSolver`] adapter so
/// the lifecycle manager never branches on which adapter produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Solve completed successfully.
    Solved {
        /// Canonical hash of the solver's output.
        output_hash: crate::core::HashDigest,
        /// BLOCK violation count reported by the solver's own audit pass.
        block_count: u32,
        /// WARN violation count reported by the solver's own audit pass.
        warn_count: u32,
        /// Canonical JSON of the produced assignments.
        assignments: serde_json::Value,
    },
    /// Solve completed with a failure.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Solver gateway errors.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver dependency (in-process or remote) could not be reached or
    /// returned a malformed response.
    #[error("solver dependency error: {0}")]
    Dependency(String),
}

/// External solver boundary: `solve(inputs, seed, policy) -> result + audits`
/// (spec §4.15). Implementations are conceptually pure given `seed`, but
/// reproducibility across differing solver library versions is not
/// guaranteed.
pub trait PlanSolver {
    /// Runs a solve for `inputs` under `seed` and `policy_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] when the solver dependency is unreachable or
    /// its response cannot be parsed.
    fn solve(
        &self,
        inputs: &serde_json::Value,
        seed: u64,
        policy_hash: &crate::core::HashDigest,
    ) -> Result<SolveOutcome, SolverError>;
}

// ============================================================================
// SECTION: Store Error
// ============================================================================

/// Persistence errors raised by any store trait in this module.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// A unique constraint was violated.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Stored data failed an integrity check on read.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Backend reported an error not covered by the other variants.
    #[error("store error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Identity & Tenant Stores (C1)
// ============================================================================

/// Persistence for tenants.
pub trait TenantStore {
    /// Inserts a new tenant, failing with [`StoreError::Conflict`] when
    /// `code` already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, tenant: &Tenant) -> Result<(), StoreError>;

    /// Loads a tenant by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError>;
}

/// Persistence for sites.
pub trait SiteStore {
    /// Inserts a new site, failing with [`StoreError::Conflict`] when
    /// `(tenant_id, site_code)` already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, site: &Site) -> Result<(), StoreError>;

    /// Loads a site scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, id: &SiteId) -> Result<Option<Site>, StoreError>;

    /// Lists every site owned by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list(&self, tenant_id: &TenantId) -> Result<Vec<Site>, StoreError>;

    /// Updates `publish_enabled` on an existing site.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the site is unknown.
    fn set_publish_enabled(
        &self,
        tenant_id: &TenantId,
        id: &SiteId,
        enabled: bool,
    ) -> Result<(), StoreError>;
}

/// Persistence for users.
pub trait UserStore {
    /// Inserts a new user, failing with [`StoreError::Conflict`] when the
    /// normalized email already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, user: &User) -> Result<(), StoreError>;

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Loads a user by normalized, case-folded email.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

// ============================================================================
// SECTION: Session Store (C2)
// ============================================================================

/// Persistence for sessions. Lookup is always by `session_hash`; the raw
/// cookie value never reaches this trait.
pub trait SessionStore {
    /// Inserts a new session row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads a session by the hash of its cookie value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get_by_hash(&self, session_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Marks a session revoked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the session is unknown.
    fn revoke(&self, id: &SessionId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: External Mapping Store (C3)
// ============================================================================

/// Persistence for external-system identifier mappings.
pub trait ExternalMappingStore {
    /// Looks up a mapping by its `(tenant, system, entity_type, external_id)`
    /// tuple.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn find(
        &self,
        tenant_id: &TenantId,
        external_system: &str,
        entity_type: &str,
        external_id: &str,
    ) -> Result<Option<ExternalMapping>, StoreError>;

    /// Inserts a new mapping row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, mapping: &ExternalMapping) -> Result<(), StoreError>;

    /// Marks a mapping deprecated without deleting it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the mapping is unknown.
    fn deprecate(&self, id: &ExternalMappingId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Plan & Snapshot Stores (C5)
// ============================================================================

/// Persistence for plan versions.
pub trait PlanStore {
    /// Inserts a new plan version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, plan: &PlanVersion) -> Result<(), StoreError>;

    /// Loads a plan version scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, id: &PlanId) -> Result<Option<PlanVersion>, StoreError>;

    /// Replaces a stored plan version wholesale. Callers are responsible for
    /// enforcing [`crate::core::PlanState::can_transition_to`] before calling.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn update(&self, plan: &PlanVersion) -> Result<(), StoreError>;

    /// Lists every plan version for `tenant_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<PlanVersion>, StoreError>;

    /// Returns whether `id` exists under some tenant other than `tenant_id`.
    /// Used to distinguish "genuinely unknown" from "exists, but scoped to
    /// another tenant" so the latter can be audited as a tenant isolation
    /// attempt before returning the same 404 either way.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn exists_for_other_tenant(&self, tenant_id: &TenantId, id: &PlanId) -> Result<bool, StoreError>;
}

/// Persistence for immutable snapshots.
pub trait SnapshotStore {
    /// Inserts a new snapshot row. Snapshots are append-only; there is no
    /// corresponding update for snapshot content, only
    /// [`SnapshotStore::update_status`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Loads a snapshot scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, id: &SnapshotId) -> Result<Option<Snapshot>, StoreError>;

    /// Lists every snapshot for a plan, ordered by `version_number` ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Snapshot>, StoreError>;

    /// Updates only `snapshot_status`, per
    /// [`crate::core::SnapshotStatus::can_transition_to`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the snapshot is unknown.
    fn update_status(
        &self,
        tenant_id: &TenantId,
        id: &SnapshotId,
        status: crate::core::SnapshotStatus,
    ) -> Result<(), StoreError>;
}

/// Persistence for operator-declared pins.
pub trait PinStore {
    /// Inserts a new pin.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or `pin_key` is already
    /// used within the plan.
    fn create(&self, pin: &Pin) -> Result<(), StoreError>;

    /// Lists every pin for a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Pin>, StoreError>;

    /// Deletes a pin.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the pin is unknown.
    fn delete(&self, tenant_id: &TenantId, id: &PinId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Repair Session Store (C6)
// ============================================================================

/// Persistence for repair sessions.
pub trait RepairSessionStore {
    /// Inserts a new repair session. Implementations must reject creation
    /// with [`StoreError::Conflict`] when an `Open` session already exists
    /// for the plan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, session: &RepairSession) -> Result<(), StoreError>;

    /// Loads a repair session scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, id: &RepairSessionId) -> Result<Option<RepairSession>, StoreError>;

    /// Returns the live `Open` session for a plan, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn find_open_for_plan(
        &self,
        tenant_id: &TenantId,
        plan_version_id: &PlanId,
    ) -> Result<Option<RepairSession>, StoreError>;

    /// Replaces a stored repair session wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn update(&self, session: &RepairSession) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Violations Cache Store (C7)
// ============================================================================

/// Persistence for the materialized gate-violation cache.
pub trait ViolationsCacheStore {
    /// Replaces the entire cached result for a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn put(&self, cache: &ViolationsCache) -> Result<(), StoreError>;

    /// Loads the cached result for a plan, if evaluated at least once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Option<ViolationsCache>, StoreError>;
}

// ============================================================================
// SECTION: Approval Request Store (C8)
// ============================================================================

/// Persistence for approval requests.
pub trait ApprovalRequestStore {
    /// Inserts a new approval request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create(&self, request: &ApprovalRequest) -> Result<(), StoreError>;

    /// Loads an approval request scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, tenant_id: &TenantId, id: &ApprovalRequestId) -> Result<Option<ApprovalRequest>, StoreError>;

    /// Replaces a stored approval request wholesale (new decisions appended,
    /// status transitions applied).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn update(&self, request: &ApprovalRequest) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Audit Log Store (C11)
// ============================================================================

/// Persistence for the append-only audit hash chain.
pub trait AuditLogStore {
    /// Appends a new event. Implementations must reject any attempt to
    /// update or delete a previously appended row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or `sequence` is not
    /// `prev_max + 1` for the tenant.
    fn append(&self, event: &AuditEvent) -> Result<(), StoreError>;

    /// Returns the most recently appended event's `entry_hash` for a tenant,
    /// or [`crate::core::GENESIS_HASH`] if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn latest_entry_hash(&self, tenant_id: &TenantId) -> Result<crate::core::HashDigest, StoreError>;

    /// Lists events for a tenant ordered by `sequence` ascending, for
    /// verification or export.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list(&self, tenant_id: &TenantId) -> Result<Vec<AuditEvent>, StoreError>;
}

// ============================================================================
// SECTION: Idempotency & Advisory Lock Stores (C11 concurrency)
// ============================================================================

/// Persistence for client idempotency-key records.
pub trait IdempotencyStore {
    /// Loads a previously recorded response for `(tenant_id, action_key)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(
        &self,
        tenant_id: &TenantId,
        action_key: &IdempotencyActionKey,
    ) -> Result<Option<IdempotencyRecord>, StoreError>;

    /// Records a response for future replay.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the key is already
    /// recorded.
    fn put(&self, record: &IdempotencyRecord) -> Result<(), StoreError>;
}

/// Persistence for per-plan advisory locks.
pub trait AdvisoryLockStore {
    /// Attempts to acquire the lock for a plan, returning `false` if a live
    /// lock is already held by a different token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn try_acquire(&self, lock: &AdvisoryLock) -> Result<bool, StoreError>;

    /// Releases a lock if `holder_token` matches the current holder.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn release(&self, tenant_id: &TenantId, plan_version_id: &PlanId, holder_token: &str) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Kill Switch Store (C10)
// ============================================================================

/// Persistence for process-wide kill-switch toggles.
pub trait KillSwitchStore {
    /// Returns whether `capability` is currently enabled for
    /// `(tenant_id, site_id)`. Implementations may cache this with a short
    /// TTL but must reflect mutations within 5 seconds (spec §4.10).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn is_enabled(&self, tenant_id: &TenantId, site_id: &SiteId, capability: &str) -> Result<bool, StoreError>;

    /// Sets the toggle for `(tenant_id, site_id, capability)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn set_enabled(
        &self,
        tenant_id: &TenantId,
        site_id: &SiteId,
        capability: &str,
        enabled: bool,
    ) -> Result<(), StoreError>;
}
