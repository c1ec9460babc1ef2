// solvereign-contract/src/tooltips.rs
// ============================================================================
// Module: Tooltip Catalog
// Description: Canonical glossary terms for Solvereign docs and UI.
// Purpose: Provide a stable key-value catalog for documentation rendering.
// Dependencies: std::collections
// ============================================================================

//! ## Overview
//! Tooltips provide short, reusable explanations for UI and documentation
//! surfaces. Keys are stable, and values are plain ASCII strings to enable
//! downstream localization pipelines.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::types::TooltipEntry;
use crate::types::TooltipsManifest;

// ============================================================================
// SECTION: Tooltip Catalog
// ============================================================================

/// Stable tooltip catalog type.
pub type TooltipCatalog = BTreeMap<String, String>;

/// Returns the canonical tooltip catalog.
#[must_use]
pub fn tooltips() -> TooltipCatalog {
    let mut catalog = BTreeMap::new();
    catalog.insert(
        String::from("plan"),
        String::from("A tenant-owned scheduling artifact that progresses through the lifecycle state machine."),
    );
    catalog.insert(
        String::from("snapshot"),
        String::from("Immutable record materialized at publish time; contains assignments, audit results, and content hashes."),
    );
    catalog.insert(
        String::from("freeze_window"),
        String::from("Time interval during which a newly published snapshot should not be superseded without explicit override."),
    );
    catalog.insert(
        String::from("lock"),
        String::from("Terminal, irreversible state of a plan; prevents all mutation of the plan and its active snapshot."),
    );
    catalog.insert(
        String::from("repair_session"),
        String::from("A server-authoritative workflow object coordinating incremental plan modifications with preview, apply, and undo."),
    );
    catalog.insert(
        String::from("pin"),
        String::from("An operator-declared constraint binding an entity to a plan, e.g. fix a driver to a tour."),
    );
    catalog.insert(
        String::from("evidence_pack"),
        String::from("Content-hashed bundle sufficient to reproduce and verify a published plan."),
    );
    catalog.insert(
        String::from("kill_switch"),
        String::from("Process-wide gate that disables publish/lock for a site or tenant on demand."),
    );
    catalog.insert(
        String::from("approval_policy"),
        String::from("Rules determining how many and which approvers are required for a given action, based on risk tiers."),
    );
    catalog.insert(
        String::from("external_mapping"),
        String::from("Unique association (tenant, system, type, external_id) to internal UUID."),
    );
    catalog.insert(
        String::from("idempotency_key"),
        String::from("Client-provided token guaranteeing at-most-one effect across retries of a mutating operation."),
    );
    catalog.insert(
        String::from("advisory_lock"),
        String::from("Cooperative, named lock used to serialize critical sections across concurrent requests."),
    );
    catalog.insert(
        String::from("audit_event"),
        String::from("Append-only, hash-chained record of a security- or governance-relevant action."),
    );
    catalog.insert(
        String::from("solver_gateway"),
        String::from("The trait boundary through which the lifecycle engine invokes the external optimization solver without depending on its internals."),
    );
    catalog.insert(
        String::from("audit_sink"),
        String::from("A pluggable destination (stderr/file/noop) for structured JSON audit events; doubles as the system's operational log."),
    );
    catalog
}

/// Returns the tooltip manifest.
#[must_use]
pub fn tooltips_manifest() -> TooltipsManifest {
    let entries = tooltips()
        .into_iter()
        .map(|(term, description)| TooltipEntry {
            title: title_case(&term),
            term,
            description,
        })
        .collect();
    TooltipsManifest {
        version: env!("CARGO_PKG_VERSION").to_string(),
        entries,
    }
}

/// Renders the tooltip catalog as a markdown glossary.
#[must_use]
pub fn tooltips_glossary_markdown() -> String {
    let mut out = String::from("# Glossary\n\n");
    for (term, description) in tooltips() {
        out.push_str(&format!("- **{}**: {description}\n", title_case(&term)));
    }
    out
}

/// Converts a `snake_case` term into a display title.
fn title_case(term: &str) -> String {
    term.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
