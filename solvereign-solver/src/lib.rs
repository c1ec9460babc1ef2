// solvereign-solver/src/lib.rs
// ============================================================================
// Module: Solvereign Solver
// Description: Solver gateway adapters implementing the PlanSolver contract.
// Purpose: Provide a deterministic reference adapter and an HTTP-delegating
//   adapter, selected by `solvereign-config`'s solver mode setting.
// Dependencies: solvereign-core, reqwest, rand, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the two [`solvereign_core::PlanSolver`] adapters named in
//! the solver gateway contract: [`DeterministicSolver`], a dependency-free
//! in-process reference implementation, and [`HttpSolver`], which delegates
//! to an external solver service over HTTP. Both report the same
//! [`solvereign_core::SolveOutcome`] shape so the plan lifecycle manager
//! never branches on which adapter is active.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod deterministic;
pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use deterministic::DeterministicSolver;
pub use http::HttpSolver;
pub use http::HttpSolverConfig;
