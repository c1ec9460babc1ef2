// solvereign-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Conformance tests for every store trait implemented by
//   SqliteStore.
// Purpose: Ensure durable persistence, tenant scoping, and the append-only /
//   immutability / locking invariants hold against a real SQLite backend.
// Dependencies: solvereign-store-sqlite, solvereign-core, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use solvereign_core::AdvisoryLock;
use solvereign_core::AdvisoryLockStore;
use solvereign_core::ApprovalRequest;
use solvereign_core::ApprovalRequestStore;
use solvereign_core::ApprovalStatus;
use solvereign_core::AuditEvent;
use solvereign_core::AuditEventId;
use solvereign_core::AuditLogStore;
use solvereign_core::AuditSeverity;
use solvereign_core::DEFAULT_HASH_ALGORITHM;
use solvereign_core::ExternalMapping;
use solvereign_core::ExternalMappingId;
use solvereign_core::ExternalMappingStore;
use solvereign_core::ForecastVersionId;
use solvereign_core::GENESIS_HASH;
use solvereign_core::HashAlgorithm;
use solvereign_core::HashDigest;
use solvereign_core::IdempotencyActionKey;
use solvereign_core::IdempotencyRecord;
use solvereign_core::IdempotencyStore;
use solvereign_core::KillSwitchStore;
use solvereign_core::MappingSyncStatus;
use solvereign_core::Pin;
use solvereign_core::PinId;
use solvereign_core::PinStore;
use solvereign_core::PlanId;
use solvereign_core::PlanState;
use solvereign_core::PlanStore;
use solvereign_core::PlanVersion;
use solvereign_core::RepairSession;
use solvereign_core::RepairSessionId;
use solvereign_core::RepairSessionStore;
use solvereign_core::RepairStatus;
use solvereign_core::RiskTier;
use solvereign_core::Session;
use solvereign_core::SessionId;
use solvereign_core::SessionStore;
use solvereign_core::Site;
use solvereign_core::SiteId;
use solvereign_core::SiteStore;
use solvereign_core::Snapshot;
use solvereign_core::SnapshotId;
use solvereign_core::SnapshotStatus;
use solvereign_core::SnapshotStore;
use solvereign_core::StoreError;
use solvereign_core::Tenant;
use solvereign_core::TenantId;
use solvereign_core::TenantStore;
use solvereign_core::Timestamp;
use solvereign_core::User;
use solvereign_core::UserId;
use solvereign_core::UserStore;
use solvereign_core::Violation;
use solvereign_core::ViolationsCache;
use solvereign_core::ViolationsCacheStore;
use solvereign_store_sqlite::SqliteStore;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("in-memory store opens")
}

fn seed_tenant_and_site(store: &SqliteStore) -> (TenantId, SiteId) {
    let tenant_id = TenantId::new("tenant-1");
    TenantStore::create(store, &Tenant {
        id: tenant_id.clone(),
        code: "T1".to_string(),
        name: "Tenant One".to_string(),
        created_at: Timestamp::from_unix_seconds(1_000),
    })
    .expect("tenant creates");
    let site_id = SiteId::new("site-1");
    SiteStore::create(store, &Site {
        id: site_id.clone(),
        tenant_id: tenant_id.clone(),
        site_code: "S1".to_string(),
        name: "Site One".to_string(),
        publish_enabled: true,
    })
    .expect("site creates");
    (tenant_id, site_id)
}

fn sample_hash(seed: &str) -> HashDigest {
    HashDigest::new(DEFAULT_HASH_ALGORITHM, seed.as_bytes())
}

// ============================================================================
// SECTION: TenantStore / SiteStore / UserStore
// ============================================================================

#[test]
fn tenant_round_trips_and_is_scoped_by_id() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let fetched = TenantStore::get(&store, &tenant_id).expect("query succeeds").expect("tenant exists");
    assert_eq!(fetched.code, "T1");
    assert!(TenantStore::get(&store, &TenantId::new("missing")).expect("query succeeds").is_none());
}

#[test]
fn site_publish_enabled_flag_updates_in_place() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    SiteStore::set_publish_enabled(&store, &tenant_id, &site_id, false).expect("update succeeds");
    let site = SiteStore::get(&store, &tenant_id, &site_id).expect("query succeeds").expect("site exists");
    assert!(!site.publish_enabled);
    let sites = SiteStore::list(&store, &tenant_id).expect("list succeeds");
    assert_eq!(sites.len(), 1);
}

#[test]
fn user_lookup_by_email_and_id_agree() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let user = User {
        id: UserId::new("user-1"),
        email: "dispatcher@example.com".to_string(),
        password_hash: "argon2-hash".to_string(),
        tenant_id: Some(tenant_id),
        is_platform: false,
        roles: vec![solvereign_core::Role::Dispatcher],
        created_at: Timestamp::from_unix_seconds(2_000),
    };
    UserStore::create(&store, &user).expect("user creates");
    let by_id = UserStore::get(&store, &user.id).expect("query succeeds").expect("user exists");
    let by_email = UserStore::get_by_email(&store, &user.email).expect("query succeeds").expect("user exists");
    assert_eq!(by_id.email, by_email.email);
    assert_eq!(by_id.roles, vec![solvereign_core::Role::Dispatcher]);
}

#[test]
fn session_revoke_is_one_shot() {
    let store = store();
    let session = Session {
        id: SessionId::new("session-1"),
        user_id: UserId::new("user-1"),
        session_hash: "hash-abc".to_string(),
        tenant_id: None,
        site_id: None,
        is_platform_scope: true,
        expires_at: Timestamp::from_unix_seconds(10_000),
        revoked_at: None,
    };
    SessionStore::create(&store, &session).expect("session creates");
    SessionStore::revoke(&store, &session.id).expect("first revoke succeeds");
    let err = SessionStore::revoke(&store, &session.id).expect_err("second revoke fails");
    assert!(matches!(err, StoreError::Backend(_)));
    let fetched = SessionStore::get_by_hash(&store, &session.session_hash).expect("query succeeds").expect("session exists");
    assert!(fetched.revoked_at.is_some());
}

#[test]
fn external_mapping_deprecate_flips_sync_status() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let mapping = ExternalMapping {
        id: ExternalMappingId::new("mapping-1"),
        tenant_id: tenant_id.clone(),
        external_system: "tms".to_string(),
        entity_type: "driver".to_string(),
        external_id: "ext-42".to_string(),
        internal_id: "driver-42".to_string(),
        sync_status: MappingSyncStatus::Active,
    };
    ExternalMappingStore::create(&store, &mapping).expect("mapping creates");
    assert!(ExternalMappingStore::find(&store, &tenant_id, "tms", "driver", "ext-42").expect("query succeeds").is_some());
    ExternalMappingStore::deprecate(&store, &mapping.id).expect("deprecate succeeds");
    let found = ExternalMappingStore::find(&store, &tenant_id, "tms", "driver", "ext-42").expect("query succeeds").expect("mapping still present");
    assert_eq!(found.sync_status, MappingSyncStatus::Deprecated);
}

// ============================================================================
// SECTION: PlanStore / SnapshotStore / PinStore
// ============================================================================

fn sample_plan(tenant_id: &TenantId, site_id: &SiteId) -> PlanVersion {
    PlanVersion {
        id: PlanId::new("plan-1"),
        tenant_id: tenant_id.clone(),
        site_id: site_id.clone(),
        forecast_version_id: ForecastVersionId::new("forecast-1"),
        state: PlanState::Draft,
        seed: 42,
        input_hash: Some(sample_hash("input")),
        output_hash: None,
        block_count: 0,
        warn_count: 0,
        current_snapshot_id: None,
        publish_count: 0,
        freeze_until: None,
        repair_source_snapshot_id: None,
        created_at: Timestamp::from_unix_seconds(3_000),
    }
}

#[test]
fn plan_update_replaces_state_and_hashes() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let mut plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    plan.state = PlanState::Solved;
    plan.output_hash = Some(sample_hash("output"));
    plan.block_count = 2;
    PlanStore::update(&store, &plan).expect("plan updates");
    let fetched = PlanStore::get(&store, &tenant_id, &plan.id).expect("query succeeds").expect("plan exists");
    assert_eq!(fetched.state, PlanState::Solved);
    assert_eq!(fetched.output_hash, Some(sample_hash("output")));
    assert_eq!(fetched.block_count, 2);
}

#[test]
fn snapshot_status_is_the_only_mutable_field() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    let snapshot = Snapshot {
        id: SnapshotId::new("snapshot-1"),
        plan_version_id: plan.id.clone(),
        tenant_id: tenant_id.clone(),
        version_number: 1,
        published_at: Timestamp::from_unix_seconds(4_000),
        published_by: UserId::new("user-1"),
        publish_reason: "initial publish".to_string(),
        freeze_until: Timestamp::from_unix_seconds(4_600),
        input_hash: sample_hash("input"),
        matrix_hash: sample_hash("matrix"),
        output_hash: sample_hash("output"),
        evidence_hash: sample_hash("evidence"),
        assignments_snapshot: serde_json::json!({"assignments": []}),
        audit_results_snapshot: serde_json::json!({"violations": []}),
        snapshot_status: SnapshotStatus::Active,
    };
    SnapshotStore::create(&store, &snapshot).expect("snapshot creates");
    SnapshotStore::update_status(&store, &tenant_id, &snapshot.id, SnapshotStatus::Superseded).expect("status update succeeds");
    let fetched = SnapshotStore::get(&store, &tenant_id, &snapshot.id).expect("query succeeds").expect("snapshot exists");
    assert_eq!(fetched.snapshot_status, SnapshotStatus::Superseded);
    assert_eq!(fetched.assignments_snapshot, snapshot.assignments_snapshot);
    let listed = SnapshotStore::list_for_plan(&store, &tenant_id, &plan.id).expect("list succeeds");
    assert_eq!(listed.len(), 1);
}

#[test]
fn pin_create_rejects_duplicate_key_for_same_plan() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    let pin = Pin {
        id: PinId::new("pin-1"),
        plan_version_id: plan.id.clone(),
        tenant_id: tenant_id.clone(),
        pin_key: "tour:t1".to_string(),
        payload: serde_json::json!({"driver_id": "d1"}),
        created_at: Timestamp::from_unix_seconds(5_000),
    };
    PinStore::create(&store, &pin).expect("first pin creates");
    let duplicate = Pin { id: PinId::new("pin-2"), ..pin.clone() };
    let err = PinStore::create(&store, &duplicate).expect_err("duplicate pin key rejected");
    assert!(matches!(err, StoreError::Conflict(_)));
    PinStore::delete(&store, &tenant_id, &pin.id).expect("delete succeeds");
    assert!(PinStore::list_for_plan(&store, &tenant_id, &plan.id).expect("list succeeds").is_empty());
}

// ============================================================================
// SECTION: RepairSessionStore
// ============================================================================

#[test]
fn repair_session_rejects_second_open_session_for_same_plan() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    let session = RepairSession {
        id: RepairSessionId::new("repair-1"),
        tenant_id: tenant_id.clone(),
        plan_version_id: plan.id.clone(),
        created_by: UserId::new("user-1"),
        created_at: Timestamp::from_unix_seconds(6_000),
        expires_at: Timestamp::from_unix_seconds(6_900),
        status: RepairStatus::Open,
        requested_changes: serde_json::json!({"swap": ["t1", "t2"]}),
        preview_payload: serde_json::json!({"diff": []}),
        baseline_assignments_hash: HashDigest { algorithm: HashAlgorithm::Sha256, value: "a".repeat(64) },
        undo_payload: None,
        idempotency_key: None,
    };
    RepairSessionStore::create(&store, &session).expect("first open session creates");
    let second =
        RepairSession { id: RepairSessionId::new("repair-2"), created_at: Timestamp::from_unix_seconds(6_100), ..session.clone() };
    let err = RepairSessionStore::create(&store, &second).expect_err("second open session rejected");
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(RepairSessionStore::find_open_for_plan(&store, &tenant_id, &plan.id).expect("query succeeds").is_some());

    let mut applied = session.clone();
    applied.status = RepairStatus::Applied;
    applied.undo_payload = Some(serde_json::json!({"restore": []}));
    RepairSessionStore::update(&store, &applied).expect("update succeeds");
    assert!(RepairSessionStore::find_open_for_plan(&store, &tenant_id, &plan.id).expect("query succeeds").is_none());
    RepairSessionStore::create(&store, &second).expect("a new open session is now allowed");
}

// ============================================================================
// SECTION: ViolationsCacheStore
// ============================================================================

#[test]
fn violations_cache_put_replaces_wholesale() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    let first = ViolationsCache::from_violations(
        plan.id.clone(),
        tenant_id.clone(),
        vec![Violation {
            rule_code: "DRIVER_HOURS_EXCEEDED".to_string(),
            severity: solvereign_core::Severity::Block,
            message: "exceeds max hours".to_string(),
            subject: serde_json::json!({"driver_id": "d1"}),
        }],
        Timestamp::from_unix_seconds(7_000),
    );
    ViolationsCacheStore::put(&store, &first).expect("first put succeeds");
    let second = ViolationsCache::from_violations(plan.id.clone(), tenant_id.clone(), vec![], Timestamp::from_unix_seconds(7_100));
    ViolationsCacheStore::put(&store, &second).expect("second put replaces first");
    let fetched = ViolationsCacheStore::get(&store, &tenant_id, &plan.id).expect("query succeeds").expect("cache exists");
    assert_eq!(fetched.block_count, 0);
    assert!(fetched.violations.is_empty());
}

// ============================================================================
// SECTION: ApprovalRequestStore
// ============================================================================

#[test]
fn approval_request_update_records_decisions() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let mut request = ApprovalRequest {
        id: solvereign_core::ApprovalRequestId::new("approval-1"),
        tenant_id: tenant_id.clone(),
        action: "plan.repair.apply".to_string(),
        entity: serde_json::json!({"plan_id": "plan-1"}),
        risk_tier: RiskTier::High,
        required_approvals: 2,
        decisions: vec![],
        status: ApprovalStatus::Pending,
        created_at: Timestamp::from_unix_seconds(8_000),
    };
    ApprovalRequestStore::create(&store, &request).expect("approval request creates");
    request.record_decision(solvereign_core::ApprovalDecision {
        approver_id: UserId::new("approver-1"),
        vote: solvereign_core::DecisionVote::Approve,
        reason: "looks safe".to_string(),
        decided_at: Timestamp::from_unix_seconds(8_100),
    });
    ApprovalRequestStore::update(&store, &request).expect("approval request updates");
    let fetched = ApprovalRequestStore::get(&store, &tenant_id, &request.id).expect("query succeeds").expect("request exists");
    assert_eq!(fetched.decisions.len(), 1);
}

// ============================================================================
// SECTION: AuditLogStore
// ============================================================================

#[test]
fn audit_log_chains_from_genesis_and_rejects_out_of_order_sequence() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let genesis = HashDigest { algorithm: HashAlgorithm::Sha256, value: GENESIS_HASH.to_string() };
    assert_eq!(AuditLogStore::latest_entry_hash(&store, &tenant_id).expect("query succeeds"), genesis);

    let first_payload = serde_json::json!({"plan_id": "plan-1"});
    let first_entry_hash = AuditEvent::compute_entry_hash(
        &genesis,
        "plan.publish",
        &None,
        &first_payload,
        AuditSeverity::Info,
        Timestamp::from_unix_seconds(9_000),
    )
    .expect("commitment hashes");
    let first_event = AuditEvent {
        id: AuditEventId::new("event-1"),
        tenant_id: tenant_id.clone(),
        sequence: 1,
        action: "plan.publish".to_string(),
        actor_user_id: None,
        payload: first_payload,
        severity: AuditSeverity::Info,
        prev_hash: genesis.clone(),
        entry_hash: first_entry_hash.clone(),
        occurred_at: Timestamp::from_unix_seconds(9_000),
    };
    AuditLogStore::append(&store, &first_event).expect("first append succeeds");
    assert_eq!(AuditLogStore::latest_entry_hash(&store, &tenant_id).expect("query succeeds"), first_entry_hash);

    let mut skipped = first_event.clone();
    skipped.id = AuditEventId::new("event-3");
    skipped.sequence = 3;
    let err = AuditLogStore::append(&store, &skipped).expect_err("out-of-order sequence rejected");
    assert!(matches!(err, StoreError::Conflict(_)));

    let events = AuditLogStore::list(&store, &tenant_id).expect("list succeeds");
    assert_eq!(events.len(), 1);
    assert!(solvereign_core::verify_chain(&events));
}

// ============================================================================
// SECTION: IdempotencyStore / AdvisoryLockStore
// ============================================================================

#[test]
fn idempotency_put_rejects_duplicate_action_key() {
    let store = store();
    let (tenant_id, _site_id) = seed_tenant_and_site(&store);
    let record = IdempotencyRecord {
        tenant_id: tenant_id.clone(),
        action_key: IdempotencyActionKey::new("action-1"),
        request_hash: sample_hash("request"),
        response_snapshot: serde_json::json!({"status": "ok"}),
        created_at: Timestamp::from_unix_seconds(10_000),
    };
    IdempotencyStore::put(&store, &record).expect("first put succeeds");
    let err = IdempotencyStore::put(&store, &record).expect_err("duplicate action key rejected");
    assert!(matches!(err, StoreError::Conflict(_)));
    let fetched = IdempotencyStore::get(&store, &tenant_id, &record.action_key).expect("query succeeds").expect("record exists");
    assert!(fetched.matches(&record.request_hash));
}

#[test]
fn advisory_lock_blocks_a_second_holder_until_released() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    let plan = sample_plan(&tenant_id, &site_id);
    PlanStore::create(&store, &plan).expect("plan creates");
    let lock_a = AdvisoryLock {
        plan_version_id: plan.id.clone(),
        tenant_id: tenant_id.clone(),
        holder_token: "holder-a".to_string(),
        acquired_at: Timestamp::from_unix_seconds(11_000),
        expires_at: Timestamp::from_unix_seconds(999_999_999),
    };
    assert!(AdvisoryLockStore::try_acquire(&store, &lock_a).expect("acquire succeeds"));
    let lock_b = AdvisoryLock { holder_token: "holder-b".to_string(), ..lock_a.clone() };
    assert!(!AdvisoryLockStore::try_acquire(&store, &lock_b).expect("acquire attempt succeeds"));
    AdvisoryLockStore::release(&store, &tenant_id, &plan.id, "holder-a").expect("release succeeds");
    assert!(AdvisoryLockStore::try_acquire(&store, &lock_b).expect("acquire succeeds after release"));
}

// ============================================================================
// SECTION: KillSwitchStore
// ============================================================================

#[test]
fn kill_switch_defaults_to_disabled_and_persists_toggles() {
    let store = store();
    let (tenant_id, site_id) = seed_tenant_and_site(&store);
    assert!(!KillSwitchStore::is_enabled(&store, &tenant_id, &site_id, "publish").expect("query succeeds"));
    KillSwitchStore::set_enabled(&store, &tenant_id, &site_id, "publish", true).expect("set succeeds");
    assert!(KillSwitchStore::is_enabled(&store, &tenant_id, &site_id, "publish").expect("query succeeds"));
    KillSwitchStore::set_enabled(&store, &tenant_id, &site_id, "publish", false).expect("toggle back succeeds");
    assert!(!KillSwitchStore::is_enabled(&store, &tenant_id, &site_id, "publish").expect("query succeeds"));
}
