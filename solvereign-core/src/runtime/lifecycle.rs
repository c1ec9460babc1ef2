// solvereign-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Solvereign Plan Lifecycle Manager
// Description: create_draft/start_solve/publish/lock orchestration over the store traits.
// Purpose: Implements C5 (Plan Lifecycle Manager).
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`PlanLifecycleManager`] is the single canonical execution path for plan
//! state transitions. Every API surface (HTTP or CLI) calls into these
//! methods rather than touching stores directly, so the precondition
//! ordering in spec §4.5 cannot be bypassed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ApiError;
use crate::core::ApproverInfo;
use crate::core::AuditEvent;
use crate::core::AuditEventId;
use crate::core::AuditSeverity;
use crate::core::ForecastVersionId;
use crate::core::HashAlgorithm;
use crate::core::HashDigest;
use crate::core::PlanId;
use crate::core::PlanState;
use crate::core::PlanVersion;
use crate::core::PolicyProfileId;
use crate::core::Role;
use crate::core::SiteId;
use crate::core::Snapshot;
use crate::core::SnapshotId;
use crate::core::SnapshotStatus;
use crate::core::TenantId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::hash_bytes;
use crate::interfaces::AuditLogStore;
use crate::interfaces::KillSwitchStore;
use crate::interfaces::PlanSolver;
use crate::interfaces::PlanStore;
use crate::interfaces::SnapshotStore;
use crate::interfaces::SolveOutcome;
use crate::interfaces::ViolationsCacheStore;
use crate::runtime::evidence_builder::EvidenceInputs;
use crate::runtime::evidence_builder::build_evidence_pack;
use crate::runtime::gate::PublishGateDecision;
use crate::runtime::gate::check_publish_allowed;

/// Policy and solved-output inputs `publish` needs to assemble the
/// plan's [`crate::core::EvidencePack`]. Grouped so `publish` doesn't
/// take an unwieldy positional argument list.
pub struct PublishEvidenceInputs {
    /// Identifier of the policy profile used to derive the constraint matrix.
    pub policy_profile_id: PolicyProfileId,
    /// Canonical hash of the policy profile's bytes.
    pub policy_hash: HashDigest,
    /// The policy profile's own canonical bytes.
    pub policy_profile_bytes: serde_json::Value,
    /// Canonical JSON of the assignments being published.
    pub assignments: serde_json::Value,
}

/// Default freeze duration applied on publish, per spec §4.5.
pub const DEFAULT_FREEZE_SECONDS: i64 = 12 * 3600;
/// Default minimum length for operator-supplied publish/lock reasons.
pub const DEFAULT_MIN_REASON_LEN: usize = 10;

/// Orchestrates plan lifecycle transitions over a store that implements
/// every trait this manager depends on.
pub struct PlanLifecycleManager<'a, Store> {
    store: &'a Store,
    min_reason_len: usize,
    freeze_seconds: i64,
    violation_detail_limit: usize,
}

impl<'a, Store> PlanLifecycleManager<'a, Store>
where
    Store: PlanStore + SnapshotStore + KillSwitchStore + ViolationsCacheStore + AuditLogStore,
{
    /// Builds a manager with spec-default configuration.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            store,
            min_reason_len: DEFAULT_MIN_REASON_LEN,
            freeze_seconds: DEFAULT_FREEZE_SECONDS,
            violation_detail_limit: 5,
        }
    }

    /// Overrides the minimum accepted reason length.
    #[must_use]
    pub const fn with_min_reason_len(mut self, min_reason_len: usize) -> Self {
        self.min_reason_len = min_reason_len;
        self
    }

    /// `create_draft(tenant, site, forecast, seed?) -> plan_id` (spec §4.5).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::internal`] when the write fails.
    pub fn create_draft(
        &self,
        id: PlanId,
        tenant_id: TenantId,
        site_id: SiteId,
        forecast_version_id: ForecastVersionId,
        seed: u64,
        now: Timestamp,
    ) -> Result<PlanVersion, ApiError> {
        let plan = PlanVersion {
            id,
            tenant_id,
            site_id,
            forecast_version_id,
            state: PlanState::Draft,
            seed,
            input_hash: None,
            output_hash: None,
            block_count: 0,
            warn_count: 0,
            current_snapshot_id: None,
            publish_count: 0,
            freeze_until: None,
            repair_source_snapshot_id: None,
            created_at: now,
        };
        PlanStore::create(self.store, &plan).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(plan)
    }

    /// `start_solve(plan_id, policy_hash)` (spec §4.5): transitions
    /// DRAFT→SOLVING, delegates to `solver`, writes `output_hash` and audit
    /// counts, and transitions to SOLVED or FAILED.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::already_locked` outside `Draft`, or
    /// `ApiError::internal` on store/solver failure.
    pub fn start_solve(
        &self,
        tenant_id: &TenantId,
        plan_id: &PlanId,
        policy_hash: &HashDigest,
        inputs: &serde_json::Value,
        solver: &impl PlanSolver,
    ) -> Result<PlanVersion, ApiError> {
        let mut plan = self.load_plan(tenant_id, plan_id)?;
        if plan.state != PlanState::Draft {
            return Err(ApiError::new(
                crate::core::ErrorKind::State,
                "INVALID_STATE_TRANSITION",
                format!("cannot start_solve from state {:?}", plan.state),
            ));
        }
        plan.state = PlanState::Solving;
        plan.input_hash = Some(hash_bytes(HashAlgorithm::Sha256, inputs.to_string().as_bytes()));
        PlanStore::update(self.store, &plan).map_err(|err| ApiError::internal(&err.to_string()))?;

        match solver.solve(inputs, plan.seed, policy_hash) {
            Ok(SolveOutcome::Solved { output_hash, block_count, warn_count, .. }) => {
                plan.output_hash = Some(output_hash);
                plan.block_count = block_count;
                plan.warn_count = warn_count;
                plan.state = PlanState::Solved;
            }
            Ok(SolveOutcome::Failed { .. }) | Err(_) => {
                plan.state = PlanState::Failed;
            }
        }
        PlanStore::update(self.store, &plan).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(plan)
    }

    /// `publish(plan_id, approver, reason, idempotency_key, force_reason?)`
    /// (spec §4.5), enforcing the six preconditions in order. Idempotency-key
    /// replay is the caller's responsibility (C12 request pipeline), not this
    /// method's.
    ///
    /// A predecessor snapshot's freeze window blocks publish unless
    /// `force_reason` is supplied, in which case publish proceeds and a
    /// WARNING-severity audit event records the override.
    ///
    /// # Errors
    ///
    /// Returns the specific `ApiError` for whichever precondition fails
    /// first, or `ApiError::internal` on store failure.
    #[allow(clippy::too_many_arguments)]
    pub fn publish(
        &self,
        tenant_id: &TenantId,
        plan_id: &PlanId,
        approver_id: &UserId,
        approver_roles: &[Role],
        reason: &str,
        matrix_hash: &HashDigest,
        new_snapshot_id: SnapshotId,
        evidence_inputs: PublishEvidenceInputs,
        force_reason: Option<&str>,
        now: Timestamp,
    ) -> Result<(PlanVersion, Snapshot), ApiError> {
        let mut plan = self.load_plan(tenant_id, plan_id)?;

        // 1. Not LOCKED.
        if plan.state == PlanState::Locked {
            return Err(ApiError::already_locked());
        }
        // 2. Kill switch not active and site publish-enabled.
        let kill_switch_enabled = self
            .store
            .is_enabled(tenant_id, &plan.site_id, "publish")
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        if !kill_switch_enabled {
            return Err(ApiError::kill_switch_active());
        }
        // 3. Approver has plan.publish.
        if !approver_roles.iter().any(|role| role.has_permission("plan.publish")) {
            return Err(ApiError::forbidden("plan.publish"));
        }
        // 4. Reason length.
        if reason.len() < self.min_reason_len {
            return Err(ApiError::reason_too_short(self.min_reason_len));
        }
        // 5. BLOCK violations.
        let cache = ViolationsCacheStore::get(self.store, tenant_id, plan_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .ok_or_else(|| ApiError::not_found("violations cache"))?;
        if let PublishGateDecision::Refused { details } = check_publish_allowed(&cache, self.violation_detail_limit) {
            return Err(ApiError::violations_block_publish(serde_json::json!({
                "block_count": cache.block_count,
                "violations": details,
            })));
        }
        // 6. Freeze window: the predecessor snapshot's freeze_until, not
        // this plan's own (which publish only ever sets on itself, at the
        // end of this same method).
        let prior_snapshots = self
            .store
            .list_for_plan(tenant_id, plan_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        let predecessor = prior_snapshots.iter().max_by_key(|snapshot| snapshot.version_number);
        let frozen_until = predecessor.filter(|snapshot| now < snapshot.freeze_until).map(|snapshot| snapshot.freeze_until);
        if let Some(frozen_until) = frozen_until {
            match force_reason {
                None => {
                    return Err(ApiError::new(
                        crate::core::ErrorKind::State,
                        "FREEZE_WINDOW_ACTIVE",
                        "plan is within its freeze window",
                    ));
                }
                Some(force_reason) => {
                    self.append_audit(
                        tenant_id,
                        "plan.publish.freeze_override",
                        Some(approver_id.clone()),
                        serde_json::json!({
                            "plan_id": plan_id.as_str(),
                            "reason": force_reason,
                            "frozen_until": frozen_until,
                        }),
                        AuditSeverity::Warning,
                        now,
                    )?;
                }
            }
        }

        if plan.state != PlanState::Solved {
            return Err(ApiError::new(
                crate::core::ErrorKind::State,
                "INVALID_STATE_TRANSITION",
                format!("cannot publish from state {:?}", plan.state),
            ));
        }

        for existing in prior_snapshots.iter().filter(|s| s.snapshot_status == SnapshotStatus::Active) {
            self.store
                .update_status(tenant_id, &existing.id, SnapshotStatus::Superseded)
                .map_err(|err| ApiError::internal(&err.to_string()))?;
        }
        let version_number = prior_snapshots.iter().map(|s| s.version_number).max().unwrap_or(0) + 1;
        let freeze_until = now.plus_seconds(self.freeze_seconds);
        let input_hash = plan.input_hash.clone().unwrap_or_else(|| hash_bytes(HashAlgorithm::Sha256, b""));
        let resolved_output_hash = plan.output_hash.clone().unwrap_or_else(|| hash_bytes(HashAlgorithm::Sha256, b""));

        let (evidence_pack, evidence_hash) = build_evidence_pack(
            tenant_id.clone(),
            plan_id.clone(),
            EvidenceInputs {
                input_hash: input_hash.clone(),
                matrix_hash: matrix_hash.clone(),
                output_hash: resolved_output_hash.clone(),
                policy_profile_id: evidence_inputs.policy_profile_id,
                policy_hash: evidence_inputs.policy_hash,
                policy_profile_bytes: evidence_inputs.policy_profile_bytes,
                seed: plan.seed,
                assignments: evidence_inputs.assignments.clone(),
            },
            &cache,
            vec![ApproverInfo {
                approver_id: approver_id.clone(),
                roles: approver_roles.iter().map(|role| format!("{role:?}")).collect(),
                decided_at: now,
            }],
            now,
        )?;

        let snapshot = Snapshot {
            id: new_snapshot_id,
            plan_version_id: plan_id.clone(),
            tenant_id: tenant_id.clone(),
            version_number,
            published_at: now,
            published_by: approver_id.clone(),
            publish_reason: reason.to_string(),
            freeze_until,
            input_hash,
            matrix_hash: matrix_hash.clone(),
            output_hash: resolved_output_hash,
            evidence_hash,
            assignments_snapshot: evidence_pack.assignments.clone(),
            audit_results_snapshot: evidence_pack.audit_results.clone(),
            snapshot_status: SnapshotStatus::Active,
        };
        SnapshotStore::create(self.store, &snapshot).map_err(|err| ApiError::internal(&err.to_string()))?;

        plan.current_snapshot_id = Some(snapshot.id.clone());
        plan.publish_count += 1;
        plan.freeze_until = Some(freeze_until);
        plan.state = PlanState::Published;
        PlanStore::update(self.store, &plan).map_err(|err| ApiError::internal(&err.to_string()))?;

        Ok((plan, snapshot))
    }

    /// `lock(plan_id, approver, reason, confirm=true)` (spec §4.5): requires
    /// PUBLISHED, re-checks approver/kill-switch/reason, transitions to
    /// LOCKED. Lock is irreversible; enforcement of "no UPDATE/DELETE on
    /// LOCKED plans" lives in the storage layer (C14).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::already_locked`, `ApiError::kill_switch_active`,
    /// `ApiError::forbidden`, or `ApiError::reason_too_short` as appropriate.
    pub fn lock(
        &self,
        tenant_id: &TenantId,
        plan_id: &PlanId,
        approver_roles: &[Role],
        reason: &str,
    ) -> Result<PlanVersion, ApiError> {
        let mut plan = self.load_plan(tenant_id, plan_id)?;
        if plan.state == PlanState::Locked {
            return Err(ApiError::already_locked());
        }
        if plan.state != PlanState::Published {
            return Err(ApiError::new(
                crate::core::ErrorKind::State,
                "INVALID_STATE_TRANSITION",
                format!("cannot lock from state {:?}", plan.state),
            ));
        }
        let kill_switch_enabled = self
            .store
            .is_enabled(tenant_id, &plan.site_id, "lock")
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        if !kill_switch_enabled {
            return Err(ApiError::kill_switch_active());
        }
        if !approver_roles.iter().any(|role| role.has_permission("plan.lock")) {
            return Err(ApiError::forbidden("plan.lock"));
        }
        if reason.len() < self.min_reason_len {
            return Err(ApiError::reason_too_short(self.min_reason_len));
        }
        plan.state = PlanState::Locked;
        PlanStore::update(self.store, &plan).map_err(|err| ApiError::internal(&err.to_string()))?;
        Ok(plan)
    }

    fn load_plan(&self, tenant_id: &TenantId, plan_id: &PlanId) -> Result<PlanVersion, ApiError> {
        PlanStore::get(self.store, tenant_id, plan_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .ok_or_else(|| ApiError::not_found("plan"))
    }

    fn append_audit(
        &self,
        tenant_id: &TenantId,
        action: &str,
        actor_user_id: Option<UserId>,
        payload: serde_json::Value,
        severity: AuditSeverity,
        now: Timestamp,
    ) -> Result<(), ApiError> {
        let prev_hash =
            AuditLogStore::latest_entry_hash(self.store, tenant_id).map_err(|err| ApiError::internal(&err.to_string()))?;
        let sequence = AuditLogStore::list(self.store, tenant_id)
            .map_err(|err| ApiError::internal(&err.to_string()))?
            .last()
            .map_or(1, |event| event.sequence + 1);
        let entry_hash = AuditEvent::compute_entry_hash(&prev_hash, action, &actor_user_id, &payload, severity, now)
            .map_err(|err| ApiError::internal(&err.to_string()))?;
        let event = AuditEvent {
            id: AuditEventId::new(format!("{}-{sequence}", tenant_id.as_str())),
            tenant_id: tenant_id.clone(),
            sequence,
            action: action.to_string(),
            actor_user_id,
            payload,
            severity,
            prev_hash,
            entry_hash,
            occurred_at: now,
        };
        AuditLogStore::append(self.store, &event).map_err(|err| ApiError::internal(&err.to_string()))
    }
}
