// solvereign-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults
// Description: Defaults and env-var override tests for SolvereignConfig.
// Purpose: Guard against silent regressions in documented default values.
// =============================================================================

use solvereign_config::SolvereignConfig;
use solvereign_config::SolverMode;

#[test]
fn empty_toml_parses_to_defaults() {
    let config: SolvereignConfig = toml::from_str("").unwrap();
    assert_eq!(config.session.ttl_seconds, 28_800);
    assert_eq!(config.repair.ttl_seconds, 1_800);
    assert_eq!(config.lifecycle.freeze_duration_hours, 12);
    assert_eq!(config.lifecycle.publish_reason_min_len, 10);
    assert_eq!(config.idempotency.ttl_seconds, 3_600);
    assert_eq!(config.kill_switch.cache_ttl_seconds, 5);
    assert_eq!(config.storage.path.to_str().unwrap(), "solvereign.sqlite3");
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.solver.mode, SolverMode::Deterministic);
    assert!(config.solver.url.is_none());
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let toml_str = r#"
        [session]
        ttl_seconds = 60
    "#;
    let config: SolvereignConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.session.ttl_seconds, 60);
    assert_eq!(config.session.cookie_prod_name, "__Host-solvereign-session");
    assert_eq!(config.repair.ttl_seconds, 1_800);
}

#[test]
fn env_override_wins_over_toml_file_value() {
    let toml_str = r#"
        [session]
        ttl_seconds = 60
    "#;
    let mut config: SolvereignConfig = toml::from_str(toml_str).unwrap();

    // SAFETY: test runs single-threaded env mutation is scoped to this test.
    unsafe {
        std::env::set_var("SESSION_TTL_SECONDS", "900");
    }
    config.apply_env_overrides().unwrap();
    unsafe {
        std::env::remove_var("SESSION_TTL_SECONDS");
    }

    assert_eq!(config.session.ttl_seconds, 900);
}

#[test]
fn invalid_env_override_is_rejected() {
    let mut config = SolvereignConfig::default();

    unsafe {
        std::env::set_var("FREEZE_DURATION_HOURS", "not-a-number");
    }
    let result = config.apply_env_overrides();
    unsafe {
        std::env::remove_var("FREEZE_DURATION_HOURS");
    }

    assert!(result.is_err());
}
