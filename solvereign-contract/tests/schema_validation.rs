// solvereign-contract/tests/schema_validation.rs
// =============================================================================
// Module: Schema Validation Tests
// Description: Validates that each catalog schema compiles and classifies
//   representative payloads correctly.
// Purpose: Guard against schema drift when endpoints change shape.
// =============================================================================

use jsonschema::JSONSchema;
use solvereign_contract::actions;

#[test]
fn every_action_schema_compiles() {
    for action in actions::actions() {
        JSONSchema::compile(&action.response_schema)
            .unwrap_or_else(|err| panic!("{}: invalid response schema: {err}", action.key));
        if let Some(request_schema) = &action.request_schema {
            JSONSchema::compile(request_schema)
                .unwrap_or_else(|err| panic!("{}: invalid request schema: {err}", action.key));
        }
    }
}

#[test]
fn login_request_schema_accepts_valid_payload_and_rejects_missing_password() {
    let catalog = actions::actions();
    let action = catalog.iter().find(|action| action.key == "auth.login").unwrap();
    let schema = JSONSchema::compile(action.request_schema.as_ref().unwrap()).unwrap();

    let valid = serde_json::json!({ "email": "ops@example.com", "password": "hunter2" });
    assert!(schema.is_valid(&valid));

    let missing_password = serde_json::json!({ "email": "ops@example.com" });
    assert!(!schema.is_valid(&missing_password));
}

#[test]
fn lock_request_schema_requires_confirm_true() {
    let catalog = actions::actions();
    let action = catalog.iter().find(|action| action.key == "plans.lock").unwrap();
    let schema = JSONSchema::compile(action.request_schema.as_ref().unwrap()).unwrap();

    assert!(schema.is_valid(&serde_json::json!({ "confirm": true })));
    assert!(!schema.is_valid(&serde_json::json!({ "confirm": false })));
    assert!(!schema.is_valid(&serde_json::json!({})));
}

#[test]
fn plan_schema_rejects_unknown_state() {
    let catalog = actions::actions();
    let action = catalog.iter().find(|action| action.key == "plans.get").unwrap();
    let schema = JSONSchema::compile(&action.response_schema).unwrap();

    let valid = serde_json::json!({
        "id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a10",
        "tenant_id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a11",
        "site_id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a12",
        "state": "draft",
        "created_at": "2026-07-29T00:00:00Z"
    });
    assert!(schema.is_valid(&valid));

    let invalid = serde_json::json!({
        "id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a10",
        "tenant_id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a11",
        "site_id": "2f3b7b9e-7f0e-4a1e-9b7a-1f6f2e3c9a12",
        "state": "mid_flight",
        "created_at": "2026-07-29T00:00:00Z"
    });
    assert!(!schema.is_valid(&invalid));
}

#[test]
fn evidence_pack_example_matches_its_schema() {
    use solvereign_contract::schemas::evidence_pack_schema;
    let schema = JSONSchema::compile(&evidence_pack_schema()).unwrap();
    let example = solvereign_contract::examples::evidence_pack_example();
    assert!(schema.is_valid(&example));
}

#[test]
fn publish_request_example_matches_its_schema() {
    use solvereign_contract::schemas::publish_request_schema;
    let schema = JSONSchema::compile(&publish_request_schema()).unwrap();
    let example = solvereign_contract::examples::publish_request_example();
    assert!(schema.is_valid(&example));
}
