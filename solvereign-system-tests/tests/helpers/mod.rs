// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Solvereign system tests.
// Purpose: Provide server/store fixtures reused across the scenario suites.
// Dependencies: solvereign-core, solvereign-server, solvereign-store-sqlite
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod harness;
