// solvereign-contract/tests/contract_builder.rs
// =============================================================================
// Module: Contract Builder Tests
// Description: Round-trips the generated artifact bundle through disk.
// Purpose: Guard build/write/verify determinism and fail-closed verification.
// =============================================================================

use solvereign_contract::ContractBuilder;

#[test]
fn build_produces_expected_artifact_paths() {
    let builder = ContractBuilder::new(ContractBuilder::default_output_dir());
    let bundle = builder.build().expect("bundle should build");

    let paths: Vec<&str> = bundle.artifacts.iter().map(|artifact| artifact.path.as_str()).collect();
    for expected in [
        "glossary.md",
        "tooltips.json",
        "actions.json",
        "actions.md",
        "schemas/config.schema.json",
        "examples/plan-create.json",
        "examples/publish-request.json",
        "examples/violations.json",
        "examples/evidence-pack.json",
        "examples/solvereign.toml",
    ] {
        assert!(paths.contains(&expected), "missing artifact: {expected}");
    }
    assert_eq!(bundle.manifest.artifacts.len(), bundle.artifacts.len());
}

#[test]
fn build_is_deterministic_across_calls() {
    let builder = ContractBuilder::new(ContractBuilder::default_output_dir());
    let first = builder.build().expect("first build");
    let second = builder.build().expect("second build");
    assert_eq!(first.manifest.artifacts, second.manifest.artifacts);
}

#[test]
fn write_then_verify_round_trips_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let builder = ContractBuilder::new(dir.path().to_path_buf());

    builder.write().expect("write should succeed");
    builder.verify_output(dir.path()).expect("verify should succeed after write");
}

#[test]
fn verify_fails_closed_when_an_artifact_is_tampered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let builder = ContractBuilder::new(dir.path().to_path_buf());
    builder.write().expect("write should succeed");

    std::fs::write(dir.path().join("actions.md"), b"tampered").expect("overwrite artifact");

    let result = builder.verify_output(dir.path());
    assert!(result.is_err(), "verification should reject a tampered artifact");
}

#[test]
fn verify_fails_closed_when_an_extra_file_is_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    let builder = ContractBuilder::new(dir.path().to_path_buf());
    builder.write().expect("write should succeed");

    std::fs::write(dir.path().join("unexpected.txt"), b"surprise").expect("write extra file");

    let result = builder.verify_output(dir.path());
    assert!(result.is_err(), "verification should reject unexpected files");
}

#[test]
fn verify_fails_closed_when_output_dir_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let builder = ContractBuilder::new(missing.clone());

    let result = builder.verify_output(&missing);
    assert!(result.is_err(), "verification should reject a missing output directory");
}
