// solvereign-solver/src/deterministic.rs
// ============================================================================
// Module: Deterministic Solver
// Description: In-process reference solver adapter.
// Purpose: Provide a stable, dependency-free solve for tests and environments
//   without a real optimization engine.
// Dependencies: solvereign-core, rand, serde_json
// ============================================================================

//! ## Overview
//! The deterministic solver is not an optimizer: it is a stable heuristic
//! that assigns every unassigned tour to a driver and vehicle using a
//! seeded round-robin, honoring any pins present in the input. Given the
//! same `inputs` and `seed`, it always produces byte-identical assignments,
//! which is what makes golden-output tests meaningful.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use solvereign_core::HashAlgorithm;
use solvereign_core::HashDigest;
use solvereign_core::PlanSolver;
use solvereign_core::SolveOutcome;
use solvereign_core::SolverError;
use solvereign_core::hash_canonical_json;

// ============================================================================
// SECTION: Input Shapes
// ============================================================================

/// Solve input shape consumed by every [`PlanSolver`] adapter.
#[derive(Debug, Clone, Deserialize)]
struct SolveInputs {
    /// Tours requiring an assignment, identified by UUID string.
    #[serde(default)]
    tours: Vec<String>,
    /// Candidate driver identifiers, identified by UUID string.
    #[serde(default)]
    drivers: Vec<String>,
    /// Candidate vehicle identifiers, identified by UUID string.
    #[serde(default)]
    vehicles: Vec<String>,
    /// Pre-existing pins that must be honored rather than reassigned.
    #[serde(default)]
    pins: Vec<PinnedAssignment>,
}

/// A pin binding a tour to a specific driver and/or vehicle.
#[derive(Debug, Clone, Deserialize)]
struct PinnedAssignment {
    /// Pinned tour identifier.
    tour_id: String,
    /// Pinned driver identifier, if the pin constrains the driver.
    #[serde(default)]
    driver_id: Option<String>,
    /// Pinned vehicle identifier, if the pin constrains the vehicle.
    #[serde(default)]
    vehicle_id: Option<String>,
}

// ============================================================================
// SECTION: Deterministic Solver
// ============================================================================

/// Deterministic, in-process reference implementation of [`PlanSolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicSolver;

impl DeterministicSolver {
    /// Creates a new deterministic solver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PlanSolver for DeterministicSolver {
    fn solve(
        &self,
        inputs: &Value,
        seed: u64,
        policy_hash: &HashDigest,
    ) -> Result<SolveOutcome, SolverError> {
        let parsed: SolveInputs = serde_json::from_value(inputs.clone())
            .map_err(|err| SolverError::Dependency(format!("invalid solve inputs: {err}")))?;

        if parsed.tours.is_empty() {
            return Ok(SolveOutcome::Failed {
                reason: String::from("no tours to assign"),
            });
        }
        if parsed.drivers.is_empty() || parsed.vehicles.is_empty() {
            return Ok(SolveOutcome::Failed {
                reason: String::from("no drivers or vehicles available"),
            });
        }

        let assignments = assign(&parsed, seed);
        let warn_count = assignments
            .iter()
            .filter(|assignment| assignment["driver_id"].is_null() || assignment["vehicle_id"].is_null())
            .count();
        let assignments_value = json!(assignments);

        let output_hash = hash_canonical_json(
            HashAlgorithm::Sha256,
            &json!({
                "assignments": assignments_value,
                "seed": seed,
                "policy_hash": policy_hash,
            }),
        )
        .map_err(|err| SolverError::Dependency(format!("failed to hash solve output: {err}")))?;

        Ok(SolveOutcome::Solved {
            output_hash,
            block_count: 0,
            warn_count: u32::try_from(warn_count).unwrap_or(u32::MAX),
            assignments: assignments_value,
        })
    }
}

/// Seconds between a driver's consecutive tours in the synthetic schedule
/// this solver lays out: an 8-hour tour followed by 16 hours of rest, so a
/// fresh reference schedule never trips the rest-time or weekly-hours gate
/// rules on its own.
const TOUR_SPAN_SECONDS: i64 = 8 * 3600;
const REST_SECONDS: i64 = 16 * 3600;

/// Assigns every tour to a driver and vehicle, honoring pins first and
/// falling back to a seeded round-robin over the remaining candidates. Each
/// assignment also carries the timing/hours fields
/// [`solvereign_core::AssignmentView`] needs for gate evaluation, laid out
/// back-to-back per driver in assignment order.
fn assign(inputs: &SolveInputs, seed: u64) -> Vec<Value> {
    let mut drivers = inputs.drivers.clone();
    let mut vehicles = inputs.vehicles.clone();
    drivers.sort();
    vehicles.sort();

    let mut rng = StdRng::seed_from_u64(seed);
    drivers.shuffle(&mut rng);
    vehicles.shuffle(&mut rng);

    let mut tours = inputs.tours.clone();
    tours.sort();

    let mut driver_tour_counts: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
    let mut out = Vec::with_capacity(tours.len());
    for (index, tour_id) in tours.into_iter().enumerate() {
        let pin = inputs.pins.iter().find(|pin| pin.tour_id == tour_id);
        let driver_id = pin
            .and_then(|pin| pin.driver_id.clone())
            .or_else(|| drivers.get(index % drivers.len().max(1)).cloned());
        let vehicle_id = pin
            .and_then(|pin| pin.vehicle_id.clone())
            .or_else(|| vehicles.get(index % vehicles.len().max(1)).cloned());

        let slot = driver_id.as_ref().map_or(0, |id| {
            let count = driver_tour_counts.entry(id.clone()).or_insert(0);
            let current = *count;
            *count += 1;
            current
        });
        let start_seconds = slot * (TOUR_SPAN_SECONDS + REST_SECONDS);
        let end_seconds = start_seconds + TOUR_SPAN_SECONDS;
        let weekly_hours = f64_from_i64(slot + 1) * f64_from_i64(TOUR_SPAN_SECONDS) / 3600.0;

        out.push(json!({
            "tour_id": tour_id,
            "driver_id": driver_id,
            "vehicle_id": vehicle_id,
            "start_seconds": start_seconds,
            "end_seconds": end_seconds,
            "rest_minutes_before": if slot == 0 { Value::Null } else { json!(REST_SECONDS / 60) },
            "weekly_hours": weekly_hours,
        }));
    }
    out
}

/// Narrowing `i64 -> f64` conversion for the small slot/span counters used
/// above, which never approach `f64`'s exact-integer limit.
#[allow(clippy::cast_precision_loss, reason = "Inputs are small tour counts and second spans, far under 2^53.")]
fn f64_from_i64(value: i64) -> f64 {
    value as f64
}
