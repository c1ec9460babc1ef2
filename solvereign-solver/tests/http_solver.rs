// solvereign-solver/tests/http_solver.rs
// ============================================================================
// Module: HTTP Solver Adapter Tests
// Description: Integration tests exercising the HTTP-delegating solver.
// Purpose: Validate success, failure, and fail-closed error-path parsing.
// Dependencies: solvereign-solver, solvereign-core, tiny_http
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::thread;

use solvereign_core::HashAlgorithm;
use solvereign_core::PlanSolver;
use solvereign_core::SolveOutcome;
use solvereign_core::hash_canonical_json;
use solvereign_solver::HttpSolver;
use solvereign_solver::HttpSolverConfig;
use tiny_http::Response;
use tiny_http::Server;

/// Spawns a local test server that responds with the given JSON body once.
fn spawn_server(body: &'static str) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind local server");
    let addr = server.server_addr().to_ip().expect("ip addr");
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body)
                .with_header(tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("header"));
            let _ = request.respond(response);
        }
    });

    (url, handle)
}

fn policy_hash() -> solvereign_core::HashDigest {
    hash_canonical_json(HashAlgorithm::Sha256, &serde_json::json!({})).expect("hash")
}

#[test]
fn solved_response_is_parsed_into_solve_outcome() {
    let body = r#"{
        "status": "solved",
        "output_hash": { "algorithm": "sha256", "value": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85" },
        "block_count": 0,
        "warn_count": 1,
        "assignments": []
    }"#;
    let (url, handle) = spawn_server(body);
    let solver = HttpSolver::new(HttpSolverConfig::new(url)).expect("build solver");

    let outcome = solver
        .solve(&serde_json::json!({}), 1, &policy_hash())
        .expect("solve should succeed");

    match outcome {
        SolveOutcome::Solved {
            warn_count,
            block_count,
            ..
        } => {
            assert_eq!(warn_count, 1);
            assert_eq!(block_count, 0);
        }
        SolveOutcome::Failed {
            ..
        } => panic!("expected a solved outcome"),
    }
    handle.join().expect("server thread");
}

#[test]
fn failed_response_is_parsed_into_solve_outcome() {
    let body = r#"{ "status": "failed", "reason": "no feasible assignment" }"#;
    let (url, handle) = spawn_server(body);
    let solver = HttpSolver::new(HttpSolverConfig::new(url)).expect("build solver");

    let outcome = solver
        .solve(&serde_json::json!({}), 1, &policy_hash())
        .expect("solve call should succeed even when the outcome is Failed");

    match outcome {
        SolveOutcome::Failed {
            reason,
        } => assert_eq!(reason, "no feasible assignment"),
        SolveOutcome::Solved {
            ..
        } => panic!("expected a failed outcome"),
    }
    handle.join().expect("server thread");
}

#[test]
fn malformed_response_body_fails_closed() {
    let (url, handle) = spawn_server("not json");
    let solver = HttpSolver::new(HttpSolverConfig::new(url)).expect("build solver");

    let result = solver.solve(&serde_json::json!({}), 1, &policy_hash());
    assert!(result.is_err(), "malformed response must surface a SolverError");
    handle.join().expect("server thread");
}

#[test]
fn unreachable_endpoint_fails_closed() {
    let solver = HttpSolver::new(HttpSolverConfig::new("http://127.0.0.1:1")).expect("build solver");
    let result = solver.solve(&serde_json::json!({}), 1, &policy_hash());
    assert!(result.is_err(), "unreachable endpoint must surface a SolverError");
}
