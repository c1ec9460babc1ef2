// solvereign-contract/tests/actions_catalog.rs
// =============================================================================
// Module: Action Catalog Tests
// Description: Integration tests for the canonical API action catalog.
// Purpose: Guard endpoint coverage, permission keys, and path uniqueness.
// =============================================================================

use solvereign_contract::HttpMethod;
use solvereign_contract::actions;

#[test]
fn catalog_covers_every_external_interface_endpoint() {
    let catalog = actions();
    let expected_paths = [
        "/auth/login",
        "/auth/logout",
        "/auth/me",
        "/plans",
        "/plans/{id}",
        "/plans/{id}/solve",
        "/snapshots/publish",
        "/plans/{id}/lock",
        "/plans/{id}/matrix",
        "/plans/{id}/violations",
        "/plans/{id}/pins",
        "/plans/{id}/pins/{pin_id}",
        "/repairs/sessions",
        "/repairs/sessions/{sid}",
        "/repairs/sessions/{sid}/apply",
        "/repairs/sessions/{sid}/undo",
        "/repairs/sessions/{sid}/abort",
        "/evidence/{snapshot_id}",
        "/audit",
        "/health",
        "/health/ready",
    ];
    assert_eq!(catalog.len(), expected_paths.len());
    for path in expected_paths {
        assert!(
            catalog.iter().any(|action| action.path == path),
            "missing action for path {path}"
        );
    }
}

#[test]
fn action_keys_are_unique() {
    let catalog = actions();
    let mut keys: Vec<&str> = catalog.iter().map(|action| action.key.as_str()).collect();
    let before = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), before);
}

#[test]
fn public_endpoints_require_no_permission() {
    let catalog = actions();
    for key in ["auth.login", "health.live", "health.ready"] {
        let action = catalog.iter().find(|action| action.key == key).unwrap();
        assert!(action.required_permission.is_none(), "{key} should be public");
    }
}

#[test]
fn mutating_endpoints_other_than_login_and_logout_are_idempotent() {
    let catalog = actions();
    for action in &catalog {
        if action.method == HttpMethod::Post && action.key != "auth.login" {
            assert!(action.idempotent, "{} should accept Idempotency-Key", action.key);
        }
    }
}

#[test]
fn pins_delete_uses_delete_method() {
    let catalog = actions();
    let action = catalog.iter().find(|action| action.key == "pins.delete").unwrap();
    assert_eq!(action.method, HttpMethod::Delete);
}

#[test]
fn publish_requires_plan_publish_permission() {
    let catalog = actions();
    let action = catalog.iter().find(|action| action.key == "snapshots.publish").unwrap();
    assert_eq!(action.required_permission.as_deref(), Some("plan.publish"));
}
