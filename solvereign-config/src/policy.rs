// solvereign-config/src/policy.rs
// ============================================================================
// Module: Policy Profile
// Description: Named constraint rule catalog evaluated by the Audit & Publish Gate.
// Purpose: Provide a content-hashed, versioned policy document (C13, C7).
// Dependencies: solvereign-core, serde
// ============================================================================

//! ## Overview
//! A policy profile is the set of named constraint rules a tenant's gate
//! evaluates at solve and publish time. Each rule carries a stable `code`
//! (the same code surfaces on [`solvereign_core::Violation`] rows) and a
//! [`Severity`]: `Block` rules refuse publish while outstanding, `Warn` rules
//! are informational only. The profile's canonical bytes are hashed with the
//! same RFC 8785 JCS hash used throughout the domain model, so an evidence
//! pack can embed the profile and prove, after the fact, exactly which rule
//! set produced a given set of violations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use solvereign_core::HashDigest;
use solvereign_core::PolicyRule;
use solvereign_core::Severity;
use solvereign_core::hash_canonical_json;

// ============================================================================
// SECTION: Policy Model
// ============================================================================

/// A single named constraint rule within a [`PolicyProfileConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRuleConfig {
    /// Stable rule code (matches `Violation::rule_code`).
    pub code: String,
    /// Severity applied when the rule is violated.
    pub severity: Severity,
    /// Human-readable description surfaced to operators.
    pub description: String,
}

impl PolicyRuleConfig {
    /// Validates a single rule.
    fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("policy.rules.code must be non-empty".to_string());
        }
        if self.code != self.code.to_uppercase() {
            return Err(format!("policy.rules.code must be UPPER_SNAKE_CASE: {}", self.code));
        }
        if self.description.trim().is_empty() {
            return Err("policy.rules.description must be non-empty".to_string());
        }
        Ok(())
    }
}

/// The policy profile evaluated by the Audit & Publish Gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyProfileConfig {
    /// Stable identifier for this profile (distinct profiles may co-exist
    /// across tenants during a rollout).
    #[serde(default = "default_profile_id")]
    pub profile_id: String,
    /// Ordered, named constraint rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<PolicyRuleConfig>,
}

impl Default for PolicyProfileConfig {
    fn default() -> Self {
        Self {
            profile_id: default_profile_id(),
            rules: default_rules(),
        }
    }
}

impl PolicyProfileConfig {
    /// Validates the policy profile for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns an error when the profile id or any rule is invalid, or when
    /// two rules share the same code.
    pub fn validate(&self) -> Result<(), String> {
        if self.profile_id.trim().is_empty() {
            return Err("policy.profile_id must be non-empty".to_string());
        }
        if self.rules.is_empty() {
            return Err("policy.rules must be non-empty".to_string());
        }
        let mut seen = std::collections::BTreeSet::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            rule.validate().map_err(|err| format!("policy.rules[{idx}]: {err}"))?;
            if !seen.insert(rule.code.clone()) {
                return Err(format!("policy.rules[{idx}]: duplicate rule code {}", rule.code));
            }
        }
        Ok(())
    }

    /// Canonical JSON bytes of this profile, suitable for embedding in an
    /// evidence pack or hashing.
    #[must_use]
    pub fn to_canonical_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Computes the RFC 8785 canonical hash of this profile.
    ///
    /// # Errors
    ///
    /// Returns a [`solvereign_core::HashError`] when the profile cannot be
    /// canonicalized (should not occur for this type, which contains no
    /// floats or maps with non-string keys).
    pub fn policy_hash(&self) -> Result<HashDigest, solvereign_core::HashError> {
        hash_canonical_json(self)
    }

    /// Returns the rule with the given code, if present.
    #[must_use]
    pub fn rule(&self, code: &str) -> Option<&PolicyRuleConfig> {
        self.rules.iter().find(|rule| rule.code == code)
    }

    /// Converts this profile into the `solvereign-core` gate's own rule-table
    /// view (`solvereign-core` does not depend on this crate). Only a code's
    /// presence here enables the corresponding gate check; the configured
    /// severity here is what the gate reports, so the profile embedded in an
    /// evidence pack always matches the violations evaluated alongside it.
    #[must_use]
    pub fn gate_rules(&self) -> Vec<PolicyRule> {
        self.rules.iter().map(|rule| PolicyRule { code: rule.code.clone(), severity: rule.severity }).collect()
    }
}

/// Default profile identifier.
fn default_profile_id() -> String {
    "default".to_string()
}

/// Default rule set: the five codes the Audit & Publish Gate's own rule
/// functions can emit (`solvereign_core::runtime::gate`). Each entry here
/// both enables the corresponding gate check and fixes the severity it
/// reports at; a code with no entry is evaluated by the gate but never
/// surfaces as a violation.
fn default_rules() -> Vec<PolicyRuleConfig> {
    vec![
        PolicyRuleConfig {
            code: "ASSIGNMENT_OVERLAP".to_string(),
            severity: Severity::Block,
            description: "A driver is assigned to two overlapping tours.".to_string(),
        },
        PolicyRuleConfig {
            code: "REST_TIME_VIOLATION".to_string(),
            severity: Severity::Block,
            description: "A driver's rest before a tour is shorter than the required minimum.".to_string(),
        },
        PolicyRuleConfig {
            code: "REST_TIME_MARGIN".to_string(),
            severity: Severity::Warn,
            description: "A driver's rest before a tour is close to the required minimum.".to_string(),
        },
        PolicyRuleConfig {
            code: "DRIVER_HOURS_EXCEEDED".to_string(),
            severity: Severity::Block,
            description: "A driver's weekly hours exceed the configured maximum.".to_string(),
        },
        PolicyRuleConfig {
            code: "DRIVER_HOURS_NEAR_LIMIT".to_string(),
            severity: Severity::Warn,
            description: "A driver's weekly hours are near the configured maximum.".to_string(),
        },
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::PolicyProfileConfig;
    use super::PolicyRuleConfig;
    use solvereign_core::Severity;

    #[test]
    fn default_profile_validates_and_hashes_deterministically() {
        let profile = PolicyProfileConfig::default();
        profile.validate().unwrap();
        let hash_a = profile.policy_hash().unwrap();
        let hash_b = profile.policy_hash().unwrap();
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn duplicate_rule_codes_are_rejected() {
        let profile = PolicyProfileConfig {
            profile_id: "p".to_string(),
            rules: vec![
                PolicyRuleConfig {
                    code: "X".to_string(),
                    severity: Severity::Block,
                    description: "one".to_string(),
                },
                PolicyRuleConfig {
                    code: "X".to_string(),
                    severity: Severity::Warn,
                    description: "two".to_string(),
                },
            ],
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn differing_rule_sets_hash_differently() {
        let mut profile = PolicyProfileConfig::default();
        let base = profile.policy_hash().unwrap();
        profile.rules.push(PolicyRuleConfig {
            code: "EXTRA_RULE".to_string(),
            severity: Severity::Warn,
            description: "extra".to_string(),
        });
        let changed = profile.policy_hash().unwrap();
        assert_ne!(base, changed);
    }
}
