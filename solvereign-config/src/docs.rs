// solvereign-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for solvereign.toml documentation.
// Purpose: Keep config docs in sync with schema and validation.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/solvereign.toml.md` from the canonical
//! configuration schema. This output is deterministic: every documented
//! field is cross-checked against [`crate::schema::config_schema`] at
//! generation time, so an undocumented or removed field fails the build
//! rather than silently drifting out of sync.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::schema::config_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "Docs/configuration/solvereign.toml.md";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Schema traversal or rendering error.
    #[error("docs schema error: {0}")]
    Schema(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
///
/// # Errors
///
/// Returns [`DocsError`] when schema traversal fails.
pub fn config_docs_markdown() -> Result<String, DocsError> {
    let schema = config_schema();
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("Docs/configuration/solvereign.toml.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: Solvereign Configuration\n");
    out.push_str("Description: Reference for solvereign.toml configuration fields.\n");
    out.push_str("Purpose: Document server, session, lifecycle, storage, solver, and policy settings.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# solvereign.toml Configuration\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("`solvereign.toml` configures the HTTP server, session/repair/idempotency\n");
    out.push_str("lifetimes, the plan lifecycle's freeze window, storage, the solver gateway,\n");
    out.push_str("and the policy profile evaluated by the Audit & Publish Gate. Every field\n");
    out.push_str("below can also be set as an environment variable (see the table header);\n");
    out.push_str("environment variables always win over the TOML file.\n\n");

    out.push_str("## Top-Level Sections\n\n");

    let sections = build_sections();
    for section in sections {
        out.push_str("### ");
        out.push_str(section.heading);
        out.push_str("\n\n");
        if !section.description.is_empty() {
            out.push_str(section.description);
            out.push_str("\n\n");
        }
        let table = render_table(&schema, &section).map_err(DocsError::Schema)?;
        out.push_str(&table);
        if let Some(extra) = section.extra {
            out.push('\n');
            out.push_str(extra);
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str("## Environment Variable Overrides\n\n");
    out.push_str("| Variable | Overrides |\n| --- | --- |\n");
    out.push_str("| `SESSION_TTL_SECONDS` | `session.ttl_seconds` |\n");
    out.push_str("| `AUTH_COOKIE_PROD_NAME` | `session.cookie_prod_name` |\n");
    out.push_str("| `AUTH_COOKIE_DEV_NAME` | `session.cookie_dev_name` |\n");
    out.push_str("| `REPAIR_SESSION_TTL_SECONDS` | `repair.ttl_seconds` |\n");
    out.push_str("| `FREEZE_DURATION_HOURS` | `lifecycle.freeze_duration_hours` |\n");
    out.push_str("| `PUBLISH_REASON_MIN_LEN` | `lifecycle.publish_reason_min_len` |\n");
    out.push_str("| `IDEMPOTENCY_TTL_SECONDS` | `idempotency.ttl_seconds` |\n");
    out.push_str("| `KILL_SWITCH_CACHE_TTL_SECONDS` | `kill_switch.cache_ttl_seconds` |\n");
    out.push_str("| `SOLVEREIGN_DB_PATH` | `storage.path` |\n");
    out.push_str("| `SOLVEREIGN_BIND_ADDR` | `server.bind` |\n");
    out.push_str("| `SOLVEREIGN_SOLVER_MODE` | `solver.mode` |\n");
    out.push_str("| `SOLVEREIGN_SOLVER_URL` | `solver.url` |\n");
    out.push_str("| `SOLVEREIGN_CONFIG` | path to the TOML file itself |\n");

    Ok(out)
}

/// Writes the generated docs to the standard location.
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = config_docs_markdown()?;
    fs::write(path, content.as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = config_docs_markdown()?;
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != content {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Section Specs
// ============================================================================

/// Specification for one rendered documentation section.
#[derive(Clone)]
struct SectionSpec {
    /// Section heading, including TOML table name.
    heading: &'static str,
    /// Section description displayed beneath the heading.
    description: &'static str,
    /// Schema traversal path used to resolve the section.
    path: &'static [SchemaPath],
    /// Ordered field list rendered in the docs table.
    fields: &'static [&'static str],
    /// Whether to include a "Required" column.
    include_required: bool,
    /// Default values that override schema defaults for docs.
    default_overrides: &'static [FieldOverride],
    /// Optional additional text appended after the table.
    extra: Option<&'static str>,
}

/// Overrides for schema defaults shown in docs tables.
#[derive(Clone, Copy)]
struct FieldOverride {
    /// Field name to override.
    field: &'static str,
    /// Replacement default value string.
    default_value: &'static str,
}

/// Path segment for resolving nested schema properties.
#[derive(Clone, Copy)]
enum SchemaPath {
    /// Descend into an object property.
    Property(&'static str),
    /// Descend into an array items schema.
    Items,
}

// ============================================================================
// SECTION: Section Registry
// ============================================================================

/// Builds the ordered list of configuration sections to render.
fn build_sections() -> Vec<SectionSpec> {
    vec![
        SectionSpec {
            heading: "[server]",
            description: "HTTP listener, body size, and publish/repair lock timeout.",
            path: &[SchemaPath::Property("server")],
            fields: &["bind", "max_body_bytes", "lock_timeout_ms"],
            include_required: false,
            default_overrides: &[],
            extra: Some("`bind` accepts any `SOLVEREIGN_BIND_ADDR`-style socket address."),
        },
        SectionSpec {
            heading: "[session]",
            description: "Operator login session lifetime and cookie names.",
            path: &[SchemaPath::Property("session")],
            fields: &["ttl_seconds", "cookie_prod_name", "cookie_dev_name"],
            include_required: false,
            default_overrides: &[],
            extra: Some(
                "The production cookie name is `__Host-` prefixed and requires `Secure`; the \
                 dev cookie name is used only when the server is not bound to TLS.",
            ),
        },
        SectionSpec {
            heading: "[repair]",
            description: "Repair session time-to-live before it lapses to Expired.",
            path: &[SchemaPath::Property("repair")],
            fields: &["ttl_seconds"],
            include_required: false,
            default_overrides: &[],
            extra: None,
        },
        SectionSpec {
            heading: "[lifecycle]",
            description: "Plan Lifecycle Manager freeze window and publish reason policy.",
            path: &[SchemaPath::Property("lifecycle")],
            fields: &["freeze_duration_hours", "publish_reason_min_len"],
            include_required: false,
            default_overrides: &[],
            extra: None,
        },
        SectionSpec {
            heading: "[idempotency]",
            description: "Retention window for idempotency key records.",
            path: &[SchemaPath::Property("idempotency")],
            fields: &["ttl_seconds"],
            include_required: false,
            default_overrides: &[],
            extra: None,
        },
        SectionSpec {
            heading: "[kill_switch]",
            description: "Read-through cache for the tenant kill-switch flag.",
            path: &[SchemaPath::Property("kill_switch")],
            fields: &["cache_ttl_seconds"],
            include_required: false,
            default_overrides: &[],
            extra: Some("Set to `0` to disable caching and always read the store directly."),
        },
        SectionSpec {
            heading: "[storage]",
            description: "SQLite file location, pragmas, and retention.",
            path: &[SchemaPath::Property("storage")],
            fields: &[
                "path",
                "busy_timeout_ms",
                "journal_mode",
                "sync_mode",
                "max_snapshot_versions",
                "audit_retention_days",
            ],
            include_required: false,
            default_overrides: &[
                FieldOverride { field: "path", default_value: "solvereign.sqlite3" },
                FieldOverride { field: "max_snapshot_versions", default_value: "null" },
                FieldOverride { field: "audit_retention_days", default_value: "null" },
            ],
            extra: Some(
                "Retention fields are opt-in: unset means keep every snapshot/audit row forever.",
            ),
        },
        SectionSpec {
            heading: "[solver]",
            description: "Plan Solver Gateway adapter selection.",
            path: &[SchemaPath::Property("solver")],
            fields: &["mode", "url"],
            include_required: false,
            default_overrides: &[FieldOverride { field: "url", default_value: "null" }],
            extra: Some(
                "`mode = \"http\"` requires `url`; `mode = \"deterministic\"` must leave `url` unset.",
            ),
        },
        SectionSpec {
            heading: "[policy]",
            description: "The named constraint rule catalog evaluated by the Audit & Publish Gate.",
            path: &[SchemaPath::Property("policy")],
            fields: &["profile_id", "rules"],
            include_required: false,
            default_overrides: &[],
            extra: Some(
                "Each `[[policy.rules]]` entry has `code` (stable, `UPPER_SNAKE_CASE`), \
                 `severity` (`BLOCK` or `WARN`), and `description`. `BLOCK` severity refuses \
                 publish while the rule is outstanding; `WARN` is informational only.",
            ),
        },
    ]
}

// ============================================================================
// SECTION: Table Rendering
// ============================================================================

/// Renders a documentation table for one section against the schema.
fn render_table(schema: &Value, section: &SectionSpec) -> Result<String, String> {
    let section_schema = schema_at(schema, section.path)?;
    let props = section_schema
        .get("properties")
        .and_then(|value| value.as_object())
        .ok_or_else(|| "schema properties missing".to_string())?;

    let mut seen = BTreeSet::new();
    for field in section.fields {
        if !props.contains_key(*field) {
            return Err(format!("missing field in schema: {field}"));
        }
        seen.insert(*field);
    }
    for key in props.keys() {
        if !seen.contains(key.as_str()) {
            return Err(format!("field not documented: {key}"));
        }
    }

    let required = section_schema
        .get("required")
        .and_then(|value| value.as_array())
        .map(|arr| arr.iter().filter_map(|val| val.as_str()).collect::<Vec<&str>>())
        .unwrap_or_default();

    let overrides = overrides_map(section.default_overrides);

    let mut table = String::new();
    if section.include_required {
        table.push_str("| Field | Type | Required | Default | Notes |\n");
        table.push_str("| --- | --- | --- | --- | --- |\n");
    } else {
        table.push_str("| Field | Type | Default | Notes |\n");
        table.push_str("| --- | --- | --- | --- |\n");
    }

    for field in section.fields {
        let raw_schema =
            props.get(*field).ok_or_else(|| format!("missing field schema: {field}"))?;
        let prop_schema = unwrap_nullable(raw_schema);
        let field_type = format_schema_type(prop_schema);
        let default_value = overrides
            .get(*field)
            .map(|value| (*value).to_string())
            .or_else(|| raw_schema.get("default").map(format_default_value))
            .or_else(|| prop_schema.get("default").map(format_default_value))
            .unwrap_or_else(|| "n/a".to_string());
        let notes = raw_schema
            .get("description")
            .and_then(|value| value.as_str())
            .or_else(|| prop_schema.get("description").and_then(|value| value.as_str()))
            .unwrap_or("");

        if section.include_required {
            let required_value = if required.contains(field) { "yes" } else { "no" };
            let _ = writeln!(
                &mut table,
                "| `{field}` | {field_type} | {required_value} | {default_value} | {notes} |"
            );
        } else {
            let _ =
                writeln!(&mut table, "| `{field}` | {field_type} | {default_value} | {notes} |");
        }
    }

    Ok(table)
}

/// Builds a lookup table for default overrides.
fn overrides_map(overrides: &[FieldOverride]) -> BTreeMap<&str, &str> {
    let mut map = BTreeMap::new();
    for override_entry in overrides {
        map.insert(override_entry.field, override_entry.default_value);
    }
    map
}

/// Resolves a schema node by walking a path of properties/items.
fn schema_at<'a>(schema: &'a Value, path: &[SchemaPath]) -> Result<&'a Value, String> {
    let mut current = schema;
    for segment in path {
        current = match segment {
            SchemaPath::Property(name) => {
                let props = current
                    .get("properties")
                    .and_then(|value| value.as_object())
                    .ok_or_else(|| format!("properties missing while seeking {name}"))?;
                let prop = props.get(*name).ok_or_else(|| format!("property not found: {name}"))?;
                unwrap_nullable(prop)
            }
            SchemaPath::Items => current
                .get("items")
                .map(unwrap_nullable)
                .ok_or_else(|| "array items missing".to_string())?,
        };
    }
    Ok(current)
}

/// Returns the non-null branch of a nullable `oneOf` schema.
fn unwrap_nullable(schema: &Value) -> &Value {
    if let Some(one_of) = schema.get("oneOf").and_then(|val| val.as_array())
        && one_of.len() == 2
        && let Some(other) =
            one_of.iter().find(|item| item.get("type").and_then(|val| val.as_str()) != Some("null"))
    {
        return other;
    }
    schema
}

/// Formats a schema type for markdown tables.
fn format_schema_type(schema: &Value) -> String {
    let raw = format_schema_type_raw(schema);
    escape_table_cell(&raw)
}

/// Formats a schema type without markdown escaping.
fn format_schema_type_raw(schema: &Value) -> String {
    if let Some(one_of) = schema.get("oneOf").and_then(|val| val.as_array()) {
        let mut types = one_of
            .iter()
            .filter(|item| item.get("type").and_then(|val| val.as_str()) != Some("null"))
            .map(format_schema_type_raw)
            .collect::<Vec<String>>();
        if types.len() == 1 {
            let mut only = types.remove(0);
            only.push_str(" | null");
            return only;
        }
    }
    if let Some(enum_vals) = schema.get("enum").and_then(|val| val.as_array()) {
        let items = enum_vals.iter().map(format_enum_value).collect::<Vec<String>>();
        return items.join(" | ");
    }
    if let Some(type_val) = schema.get("type") {
        if let Some(type_str) = type_val.as_str() {
            return match type_str {
                "string" => "string".to_string(),
                "integer" => "integer".to_string(),
                "number" => "number".to_string(),
                "boolean" => "bool".to_string(),
                "array" => "array".to_string(),
                "object" => "table".to_string(),
                _ => type_str.to_string(),
            };
        }
        if let Some(type_arr) = type_val.as_array() {
            let types = type_arr.iter().filter_map(|val| val.as_str()).collect::<Vec<&str>>();
            if types.len() > 2 {
                return "json".to_string();
            }
            return types.join(" | ");
        }
    }
    "unknown".to_string()
}

/// Escapes pipe characters for markdown table cells.
fn escape_table_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Formats enum values as TOML-compatible strings.
fn format_enum_value(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), |text| format!("\"{text}\""))
}

/// Formats schema defaults for display in docs.
fn format_default_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(val) => val.to_string(),
        Value::Number(val) => val.to_string(),
        Value::String(val) => val.clone(),
        Value::Array(arr) => {
            if arr.is_empty() {
                "[]".to_string()
            } else {
                let items = arr.iter().map(format_enum_value).collect::<Vec<String>>();
                format!("[{}]", items.join(", "))
            }
        }
        Value::Object(_) => "{...}".to_string(),
    }
}
