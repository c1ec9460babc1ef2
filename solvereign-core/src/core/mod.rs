// solvereign-core/src/core/mod.rs
// ============================================================================
// Module: Solvereign Core Types
// Description: Canonical domain schema for tenants, plans, and governance records.
// Purpose: Provide stable, serializable types shared by every engine and store.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Solvereign core types define the tenant/session identity model, the plan
//! lifecycle and its snapshots, repair sessions, gate violations, the
//! approval policy model, the audit hash chain, and the evidence pack. These
//! types are the canonical source of truth for every derived API surface
//! (HTTP or CLI).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod approval;
pub mod audit;
pub mod errors;
pub mod evidence_pack;
pub mod hashing;
pub mod idempotency;
pub mod identifiers;
pub mod plan;
pub mod repair;
pub mod tenancy;
pub mod time;
pub mod violations;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use approval::ApprovalDecision;
pub use approval::ApprovalRequest;
pub use approval::ApprovalStatus;
pub use approval::ApproverInfo;
pub use approval::DecisionVote;
pub use approval::RiskContext;
pub use approval::RiskTier;
pub use approval::compute_risk_tier;
pub use audit::AuditEvent;
pub use audit::GENESIS_HASH;
pub use audit::verify_chain;
pub use errors::ApiError;
pub use errors::ErrorKind;
pub use evidence_pack::EvidencePack;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_bytes;
pub use hashing::hash_canonical_json;
pub use idempotency::AdvisoryLock;
pub use idempotency::IdempotencyRecord;
pub use identifiers::ApprovalRequestId;
pub use identifiers::AuditEventId;
pub use identifiers::ExternalMappingId;
pub use identifiers::ForecastVersionId;
pub use identifiers::IdempotencyActionKey;
pub use identifiers::PinId;
pub use identifiers::PlanId;
pub use identifiers::PolicyProfileId;
pub use identifiers::RepairSessionId;
pub use identifiers::SessionId;
pub use identifiers::SiteId;
pub use identifiers::SnapshotId;
pub use identifiers::TenantId;
pub use identifiers::TraceId;
pub use identifiers::UserId;
pub use plan::Pin;
pub use plan::PlanState;
pub use plan::PlanVersion;
pub use plan::Snapshot;
pub use plan::SnapshotStatus;
pub use repair::RepairSession;
pub use repair::RepairStatus;
pub use tenancy::ExternalMapping;
pub use tenancy::MappingSyncStatus;
pub use tenancy::Role;
pub use tenancy::Session;
pub use tenancy::Site;
pub use tenancy::Tenant;
pub use tenancy::User;
pub use time::Timestamp;
pub use violations::Severity;
pub use violations::Violation;
pub use violations::ViolationsCache;
