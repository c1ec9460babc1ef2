// solvereign-config/tests/docs_validation.rs
// =============================================================================
// Module: Docs Validation
// Description: Checks the generated docs stay consistent with the schema.
// Purpose: Catch undocumented or removed config fields before they ship.
// =============================================================================

use solvereign_config::config_docs_markdown;
use solvereign_config::config_toml_example;

#[test]
fn docs_generate_without_error() {
    let markdown = config_docs_markdown().unwrap();
    assert!(markdown.contains("# solvereign.toml Configuration"));
    assert!(markdown.contains("[server]"));
    assert!(markdown.contains("[policy]"));
}

#[test]
fn docs_mention_every_environment_variable() {
    let markdown = config_docs_markdown().unwrap();
    for var in [
        "SESSION_TTL_SECONDS",
        "REPAIR_SESSION_TTL_SECONDS",
        "FREEZE_DURATION_HOURS",
        "PUBLISH_REASON_MIN_LEN",
        "IDEMPOTENCY_TTL_SECONDS",
        "KILL_SWITCH_CACHE_TTL_SECONDS",
        "SOLVEREIGN_DB_PATH",
        "SOLVEREIGN_BIND_ADDR",
        "SOLVEREIGN_SOLVER_MODE",
        "SOLVEREIGN_SOLVER_URL",
    ] {
        assert!(markdown.contains(var), "docs missing {var}");
    }
}

#[test]
fn example_toml_parses_and_validates() {
    let example = config_toml_example();
    let mut config: solvereign_config::SolvereignConfig = toml::from_str(&example).unwrap();
    config.validate().unwrap();
}

#[test]
fn example_toml_round_trips_policy_rules() {
    let example = config_toml_example();
    let config: solvereign_config::SolvereignConfig = toml::from_str(&example).unwrap();
    assert_eq!(config.policy.rules.len(), 5);
    assert!(config.policy.rule("ASSIGNMENT_OVERLAP").is_some());
}
