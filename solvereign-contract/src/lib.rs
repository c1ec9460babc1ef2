// solvereign-contract/src/lib.rs
// ============================================================================
// Module: Solvereign Contract Library
// Description: Canonical contract definitions and generators for Solvereign.
// Purpose: Provide the invariant API action catalog used by docs and tests.
// Dependencies: solvereign-core, solvereign-config, serde, thiserror
// ============================================================================

//! ## Overview
//! The contract library defines the canonical, machine-readable HTTP action
//! catalog for Solvereign. It is the single source of truth for endpoint
//! paths, permission keys, and request/response schemas, consumed by
//! `solvereign-server`'s router/RBAC wiring, `solvereign-system-tests`'s
//! scenario drivers, and the generated docs bundle.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod contract;
pub mod examples;
pub mod schemas;
pub mod tooltips;
pub mod types;

// ============================================================================
// SECTION: Errors
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when generating contract artifacts.
#[derive(Debug, Error)]
pub enum ContractError {
    /// IO failure while writing artifacts.
    #[error("io error: {0}")]
    Io(String),
    /// Serialization failure while rendering artifacts.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Contract generation failed.
    #[error("contract generation error: {0}")]
    Generation(String),
    /// Output path invalid or inaccessible.
    #[error("invalid output path: {0}")]
    OutputPath(PathBuf),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actions::actions;
pub use contract::ContractBuilder;
pub use types::ActionCatalog;
pub use types::ApiAction;
pub use types::ContractArtifact;
pub use types::ContractBundle;
pub use types::ContractManifest;
pub use types::HttpMethod;
pub use types::ManifestArtifact;
