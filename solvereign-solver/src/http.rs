// solvereign-solver/src/http.rs
// ============================================================================
// Module: HTTP Solver Adapter
// Description: Delegates solve requests to an external solver service.
// Purpose: Allow the real optimization engine to run as a separate process.
// Dependencies: solvereign-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The HTTP adapter posts the canonical solve request to a configured
//! endpoint and parses the response into a [`SolveOutcome`]. It enforces a
//! request timeout and a response size limit so an unreachable or
//! misbehaving solver service fails closed rather than hanging the calling
//! request handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use solvereign_core::HashDigest;
use solvereign_core::PlanSolver;
use solvereign_core::SolveOutcome;
use solvereign_core::SolverError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP solver adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSolverConfig {
    /// Base URL of the external solver service's `/solve` endpoint.
    pub url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl HttpSolverConfig {
    /// Creates a configuration pointed at `url` with the adapter's defaults.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: 30_000,
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Response Shape
// ============================================================================

/// Wire response returned by the external solver service.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SolverResponse {
    /// Solve succeeded.
    Solved {
        /// Canonical hash of the solver's output, as reported by the service.
        output_hash: HashDigest,
        /// BLOCK violation count reported by the solver's own audit pass.
        block_count: u32,
        /// WARN violation count reported by the solver's own audit pass.
        warn_count: u32,
        /// Canonical JSON of the produced assignments.
        assignments: Value,
    },
    /// Solve failed.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: HTTP Solver Adapter
// ============================================================================

/// HTTP-delegating implementation of [`PlanSolver`].
pub struct HttpSolver {
    /// Adapter configuration, including the target URL and limits.
    config: HttpSolverConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpSolver {
    /// Creates a new HTTP solver adapter with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] when the HTTP client cannot be created.
    pub fn new(config: HttpSolverConfig) -> Result<Self, SolverError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SolverError::Dependency(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            client,
        })
    }
}

impl PlanSolver for HttpSolver {
    fn solve(
        &self,
        inputs: &Value,
        seed: u64,
        policy_hash: &HashDigest,
    ) -> Result<SolveOutcome, SolverError> {
        let request_body = json!({
            "inputs": inputs,
            "seed": seed,
            "policy_hash": policy_hash,
        });

        let mut response = self
            .client
            .post(self.config.url.as_str())
            .json(&request_body)
            .send()
            .map_err(|err| SolverError::Dependency(format!("solver request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(SolverError::Dependency(format!(
                "solver service returned status {}",
                response.status()
            )));
        }

        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let parsed: SolverResponse = serde_json::from_slice(&body)
            .map_err(|err| SolverError::Dependency(format!("invalid solver response: {err}")))?;

        Ok(match parsed {
            SolverResponse::Solved {
                output_hash,
                block_count,
                warn_count,
                assignments,
            } => SolveOutcome::Solved {
                output_hash,
                block_count,
                warn_count,
                assignments,
            },
            SolverResponse::Failed {
                reason,
            } => SolveOutcome::Failed {
                reason,
            },
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, SolverError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SolverError::Dependency(String::from("response size limit exceeds u64")))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(SolverError::Dependency(String::from("solver response exceeds size limit")));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|err| SolverError::Dependency(format!("failed to read solver response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(SolverError::Dependency(String::from("solver response exceeds size limit")));
    }
    Ok(buf)
}
