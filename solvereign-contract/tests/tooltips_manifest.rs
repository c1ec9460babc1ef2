// solvereign-contract/tests/tooltips_manifest.rs
// =============================================================================
// Module: Tooltip Manifest Tests
// Description: Validates the tooltip/glossary catalog.
// Purpose: Keep glossary terms stable and complete.
// =============================================================================

use solvereign_contract::tooltips::tooltips;
use solvereign_contract::tooltips::tooltips_glossary_markdown;
use solvereign_contract::tooltips::tooltips_manifest;

#[test]
fn glossary_covers_core_lifecycle_terms() {
    let catalog = tooltips();
    for term in ["plan", "snapshot", "freeze_window", "lock", "repair_session", "pin"] {
        assert!(catalog.contains_key(term), "missing glossary term: {term}");
    }
}

#[test]
fn no_tooltip_description_is_empty() {
    for (term, description) in tooltips() {
        assert!(!description.trim().is_empty(), "{term} has empty description");
    }
}

#[test]
fn manifest_entry_count_matches_catalog_size() {
    let manifest = tooltips_manifest();
    assert_eq!(manifest.entries.len(), tooltips().len());
}

#[test]
fn manifest_titles_are_title_cased() {
    let manifest = tooltips_manifest();
    let entry = manifest.entries.iter().find(|entry| entry.term == "repair_session").unwrap();
    assert_eq!(entry.title, "Repair Session");
}

#[test]
fn glossary_markdown_mentions_every_term_title() {
    let markdown = tooltips_glossary_markdown();
    let manifest = tooltips_manifest();
    for entry in manifest.entries {
        assert!(markdown.contains(&entry.title), "glossary markdown missing {}", entry.title);
    }
}
