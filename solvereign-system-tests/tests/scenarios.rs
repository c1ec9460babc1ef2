// system-tests/tests/scenarios.rs
// ============================================================================
// Module: End-to-End Scenario Aggregator
// Description: Aggregates every end-to-end scenario suite into one binary.
// Purpose: Reduce test binaries while keeping scenario coverage centralized.
// Dependencies: helpers, suites/*
// ============================================================================

mod helpers;

#[path = "suites/happy_publish.rs"]
mod happy_publish;
#[path = "suites/block_gate.rs"]
mod block_gate;
#[path = "suites/concurrent_repair_creation.rs"]
mod concurrent_repair_creation;
#[path = "suites/expired_apply.rs"]
mod expired_apply;
#[path = "suites/lock_irreversibility.rs"]
mod lock_irreversibility;
#[path = "suites/cross_tenant_denial.rs"]
mod cross_tenant_denial;
