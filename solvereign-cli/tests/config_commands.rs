// solvereign-cli/tests/config_commands.rs
// ============================================================================
// Module: CLI Config and Migrate Command Tests
// Description: Integration tests for config validation and schema migration
//   run through the actual binary.
// Purpose: Ensure `config check` and `migrate` report success on a fresh
//   store and fail closed on invalid configuration.
// Dependencies: solvereign-cli binary, tempfile
// ============================================================================

//! ## Overview
//! Runs the CLI binary end to end for `config check` and `migrate`, driving
//! it the way an operator's deploy script would: a config file on disk, a
//! fresh database path, and an inspection of stdout/exit code.
//!
//! Security posture: configuration inputs are untrusted; validation must
//! fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn solvereign_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_solvereign"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn version_flag_prints_version_and_exits_success() {
    let output = Command::new(solvereign_bin()).arg("--version").output().expect("binary runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert!(stdout.starts_with("solvereign "), "unexpected version output: {stdout}");
}

#[test]
fn config_check_reports_defaults_when_no_file_is_given() {
    let dir = tempfile::tempdir().expect("temp dir creates");
    let config_path = dir.path().join("missing.toml");

    let output = Command::new(solvereign_bin())
        .args(["config", "check", "--config"])
        .arg(&config_path)
        .output()
        .expect("binary runs");

    assert!(!output.status.success(), "a missing explicit config path should fail closed");
}

#[test]
fn config_check_accepts_a_minimal_toml_file() {
    let dir = tempfile::tempdir().expect("temp dir creates");
    let db_path = dir.path().join("store.sqlite3");
    let config_path = dir.path().join("solvereign.toml");
    fs::write(&config_path, format!("[storage]\npath = {:?}\n", db_path.to_string_lossy())).expect("config writes");

    let output = Command::new(solvereign_bin())
        .args(["config", "check", "--config"])
        .arg(&config_path)
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert!(stdout.contains("Config valid"), "unexpected output: {stdout}");
}

#[test]
fn migrate_initializes_a_fresh_database_and_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir creates");
    let db_path = dir.path().join("store.sqlite3");
    let config_path = dir.path().join("solvereign.toml");
    fs::write(&config_path, format!("[storage]\npath = {:?}\n", db_path.to_string_lossy())).expect("config writes");

    let first = Command::new(solvereign_bin())
        .args(["migrate", "--config"])
        .arg(&config_path)
        .output()
        .expect("binary runs");
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(db_path.exists(), "migrate should create the database file");

    let second = Command::new(solvereign_bin())
        .args(["migrate", "--config"])
        .arg(&config_path)
        .output()
        .expect("binary runs");
    assert!(second.status.success(), "re-running migrate against an up-to-date schema should succeed");
}
