// solvereign-core/src/core/identifiers.rs
// ============================================================================
// Module: Solvereign Identifiers
// Description: Canonical opaque identifiers for tenants, plans, and governance records.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Solvereign. Identifiers are opaque and serialize as strings. Validation is
//! handled at request or storage boundaries rather than within these simple
//! wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Declares an opaque, string-backed identifier newtype with the standard
/// constructor/accessor/conversion set used across this module.
macro_rules! id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

id_type!(TenantId, "Tenant identifier, canonical for all scoped data.");
id_type!(SiteId, "Depot/location identifier within a tenant.");
id_type!(UserId, "Authenticatable principal identifier.");
id_type!(SessionId, "Session row identifier (never the raw cookie value).");
id_type!(ExternalMappingId, "External-mapping row identifier.");
id_type!(PlanId, "Plan version identifier.");
id_type!(SnapshotId, "Immutable snapshot identifier.");
id_type!(PinId, "Operator-declared pin identifier.");
id_type!(RepairSessionId, "Repair session identifier.");
id_type!(AuditEventId, "Audit log event identifier.");
id_type!(ApprovalRequestId, "Approval policy request identifier.");
id_type!(IdempotencyActionKey, "Idempotency action key (client-scoped).");
id_type!(PolicyProfileId, "Content-addressed policy profile identifier.");
id_type!(ForecastVersionId, "Upstream forecast version identifier.");
id_type!(TraceId, "Per-request trace identifier surfaced to clients.");

#[cfg(test)]
mod tests {
    use super::TenantId;

    #[test]
    fn round_trips_through_display_and_as_str() {
        let id = TenantId::new("acme");
        assert_eq!(id.as_str(), "acme");
        assert_eq!(id.to_string(), "acme");
    }

    #[test]
    fn converts_from_owned_and_borrowed_strings() {
        let from_owned: TenantId = String::from("acme").into();
        let from_borrowed: TenantId = "acme".into();
        assert_eq!(from_owned, from_borrowed);
    }
}
