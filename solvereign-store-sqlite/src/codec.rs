// solvereign-store-sqlite/src/codec.rs
// ============================================================================
// Module: Row Codec Helpers
// Description: Shared hash-column and JSON-column encode/decode helpers.
// Purpose: Keep the per-aggregate store modules free of repeated
//   serialization boilerplate.
// Dependencies: serde, serde_json, solvereign-core
// ============================================================================

//! ## Overview
//! Every [`solvereign_core::core::HashDigest`] field is stored as a pair of
//! columns (`..._algorithm`, `..._value`) rather than a single JSON blob, so
//! it stays queryable and indexable like the rest of a row. Structured
//! payload fields (`serde_json::Value`, `Vec<Violation>`, and similar) are
//! stored as canonical JSON text and parsed back on read, failing closed
//! with [`SqliteStoreError::Corrupt`] on any row that does not round-trip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use solvereign_core::HashAlgorithm;
use solvereign_core::HashDigest;

use crate::config::SqliteStoreError;

// ============================================================================
// SECTION: Hash Columns
// ============================================================================

/// Returns the `(algorithm, value)` column pair for a hash digest.
#[must_use]
pub(crate) fn hash_columns(digest: &HashDigest) -> (&'static str, &str) {
    (hash_algorithm_label(digest.algorithm), digest.value.as_str())
}

/// Returns the stable string label stored for a [`HashAlgorithm`].
#[must_use]
pub(crate) const fn hash_algorithm_label(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

/// Parses a stored algorithm label back into a [`HashAlgorithm`].
pub(crate) fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteStoreError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteStoreError::Corrupt(format!("unknown hash algorithm: {other}"))),
    }
}

/// Reassembles a [`HashDigest`] from stored column values.
pub(crate) fn decode_hash(algorithm: &str, value: &str) -> Result<HashDigest, SqliteStoreError> {
    Ok(HashDigest { algorithm: parse_hash_algorithm(algorithm)?, value: value.to_string() })
}

// ============================================================================
// SECTION: JSON Columns
// ============================================================================

/// Serializes `value` to canonical-enough JSON text for storage.
pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, SqliteStoreError> {
    serde_json::to_string(value).map_err(|err| SqliteStoreError::Invalid(format!("failed to encode json column: {err}")))
}

/// Parses a stored JSON column back into `T`, failing closed on corruption.
pub(crate) fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, SqliteStoreError> {
    serde_json::from_str(text).map_err(|err| SqliteStoreError::Corrupt(format!("stored json column is unreadable: {err}")))
}
