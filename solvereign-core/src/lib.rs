// solvereign-core/src/lib.rs
// ============================================================================
// Module: Solvereign Core Library
// Description: Public API surface for the Solvereign governance core.
// Purpose: Expose domain types, store contracts, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Solvereign core provides the tenant/plan/repair/approval/audit domain
//! model, the storage trait contracts every backend implements, and the
//! runtime engines (plan lifecycle, repair sessions, approval policy,
//! evidence pack assembly, the audit/publish gate) that are the sole
//! canonical path for mutating governance state. It is backend-agnostic:
//! `solvereign-store-sqlite` and the in-memory store here both implement the
//! same `interfaces` traits, and `solvereign-server`/`solvereign-cli` drive
//! the same `runtime` engines regardless of which store backs them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AdvisoryLockStore;
pub use interfaces::ApprovalRequestStore;
pub use interfaces::AuditLogStore;
pub use interfaces::ExternalMappingStore;
pub use interfaces::IdempotencyStore;
pub use interfaces::KillSwitchStore;
pub use interfaces::PinStore;
pub use interfaces::PlanSolver;
pub use interfaces::PlanStore;
pub use interfaces::RepairSessionStore;
pub use interfaces::SessionStore;
pub use interfaces::SiteStore;
pub use interfaces::SnapshotStore;
pub use interfaces::SolveOutcome;
pub use interfaces::SolverError;
pub use interfaces::StoreError;
pub use interfaces::TenantStore;
pub use interfaces::UserStore;
pub use interfaces::ViolationsCacheStore;
pub use runtime::ApprovalEngine;
pub use runtime::AssignmentView;
pub use runtime::DEFAULT_FREEZE_SECONDS;
pub use runtime::DEFAULT_MIN_REASON_LEN;
pub use runtime::DEFAULT_TTL_SECONDS;
pub use runtime::InMemoryStore;
pub use runtime::PlanLifecycleManager;
pub use runtime::PolicyRule;
pub use runtime::PublishEvidenceInputs;
pub use runtime::PublishGateDecision;
pub use runtime::RepairSessionEngine;
pub use runtime::build_evidence_pack;
pub use runtime::check_publish_allowed;
pub use runtime::compute_violations;
