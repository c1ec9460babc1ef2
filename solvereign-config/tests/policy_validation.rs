// solvereign-config/tests/policy_validation.rs
// =============================================================================
// Module: Policy Validation
// Description: Validation tests for the [policy] config section.
// Purpose: Guard policy profile parsing, hashing, and error paths.
// =============================================================================

use solvereign_config::SolvereignConfig;

#[test]
fn policy_with_no_rules_is_rejected() {
    let toml_str = r#"
        [policy]
        profile_id = "empty"
        rules = []
    "#;
    let mut config: SolvereignConfig = toml::from_str(toml_str).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn lowercase_rule_code_is_rejected() {
    let toml_str = r#"
        [[policy.rules]]
        code = "lowercase_code"
        severity = "BLOCK"
        description = "bad code"
    "#;
    let mut config: SolvereignConfig = toml::from_str(toml_str).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn duplicate_rule_codes_are_rejected_end_to_end() {
    let toml_str = r#"
        [[policy.rules]]
        code = "DUPLICATE"
        severity = "BLOCK"
        description = "first"

        [[policy.rules]]
        code = "DUPLICATE"
        severity = "WARN"
        description = "second"
    "#;
    let mut config: SolvereignConfig = toml::from_str(toml_str).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn custom_profile_parses_and_hashes() {
    let toml_str = r#"
        [policy]
        profile_id = "custom"

        [[policy.rules]]
        code = "CUSTOM_RULE"
        severity = "WARN"
        description = "a custom softcheck"
    "#;
    let mut config: SolvereignConfig = toml::from_str(toml_str).unwrap();
    config.validate().unwrap();
    assert_eq!(config.policy.profile_id, "custom");
    let hash = config.policy.policy_hash().unwrap();
    assert_eq!(hash, config.policy.policy_hash().unwrap());
}
