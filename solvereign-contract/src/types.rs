// solvereign-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared data models for Solvereign contract artifacts.
// Purpose: Provide canonical shapes for the API action catalog, docs, and tests.
// Dependencies: solvereign-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the typed contract shapes that are serialized into the
//! generated artifacts under `Docs/generated/solvereign`. These are the
//! canonical source for docs, client tooling, and validation tests: every
//! HTTP endpoint named in the external interface is represented once here,
//! and the server, RBAC layer, and system tests all resolve against the same
//! catalog rather than re-declaring endpoint paths and permission keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use solvereign_core::hashing::HashAlgorithm;
use solvereign_core::hashing::HashDigest;

// ============================================================================
// SECTION: Manifest Types
// ============================================================================

/// Manifest describing the generated contract artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractManifest {
    /// Contract version identifier (matches the crate version).
    pub contract_version: String,
    /// Hash algorithm used for artifact digests.
    pub hash_algorithm: HashAlgorithm,
    /// Artifacts included in the bundle, ordered by path.
    pub artifacts: Vec<ManifestArtifact>,
}

/// Manifest entry describing a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestArtifact {
    /// Relative artifact path under the output directory.
    pub path: String,
    /// Artifact content type.
    pub content_type: String,
    /// Content digest for the artifact payload.
    pub digest: HashDigest,
}

// ============================================================================
// SECTION: Bundle Types
// ============================================================================

/// Generated contract bundle with artifacts and manifest metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBundle {
    /// Manifest describing the artifacts.
    pub manifest: ContractManifest,
    /// Artifact payloads included in the bundle.
    pub artifacts: Vec<ContractArtifact>,
}

/// Artifact payload with content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Relative artifact path under the output directory.
    pub path: String,
    /// MIME content type for the artifact.
    pub content_type: String,
    /// Serialized artifact payload bytes.
    pub bytes: Vec<u8>,
}

// ============================================================================
// SECTION: API Action Catalog
// ============================================================================

/// HTTP method for an [`ApiAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical string label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// One endpoint in the external HTTP surface.
///
/// # Invariants
/// - `path` uses `{param}` placeholders, matching the router's path syntax.
/// - `required_permission` is `None` only for endpoints reachable before or
///   without a session (`/auth/login`, `/health`, `/health/ready`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAction {
    /// Stable action key, e.g. `plans.create`.
    pub key: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template.
    pub path: String,
    /// One-line purpose description.
    pub description: String,
    /// Permission string checked by the RBAC layer, if any.
    pub required_permission: Option<String>,
    /// Whether this endpoint accepts an `Idempotency-Key` header.
    pub idempotent: bool,
    /// JSON schema for the request body, if the endpoint accepts one.
    pub request_schema: Option<Value>,
    /// JSON schema for the success response body.
    pub response_schema: Value,
}

/// Full action catalog contract, generated and re-generated deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCatalog {
    /// Catalog format version.
    pub version: String,
    /// Actions, ordered as declared in the external interface table.
    pub actions: Vec<ApiAction>,
}

// ============================================================================
// SECTION: Tooltip Catalog
// ============================================================================

/// Tooltip manifest used to annotate documentation code blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipsManifest {
    /// Tooltip manifest version.
    pub version: String,
    /// Tooltip entries, ordered by term.
    pub entries: Vec<TooltipEntry>,
}

/// Tooltip entry for a term used in documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipEntry {
    /// Term to highlight in code blocks.
    pub term: String,
    /// Tooltip title label.
    pub title: String,
    /// Tooltip body description.
    pub description: String,
}
