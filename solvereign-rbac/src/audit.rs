// solvereign-rbac/src/audit.rs
// ============================================================================
// Module: Auth Audit Sink
// Description: Structured audit events for login, session validation, and
//   permission checks.
// Purpose: Give C16 (Observability) a record of every authn/authz decision
//   independent of the governance audit log, which only records state
//   mutations.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This sink is deliberately separate from [`solvereign_core::AuditLogStore`]:
//! the governance audit log is an append-only, hash-chained record of state
//! mutations, while this one is a best-effort stream of authn/authz
//! decisions (including ones that never touch the store, like a failed
//! login). Losing an event here is an observability gap, not a correctness
//! defect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Event
// ============================================================================

/// A single authn/authz decision, ready to serialize to a log sink.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAuditEvent {
    /// Event kind: `"login"`, `"session_validate"`, or `"permission_check"`.
    event: &'static str,
    /// Decision outcome: `"allow"` or `"deny"`.
    decision: &'static str,
    /// Subject identity, when known (normalized email or user id).
    subject: Option<String>,
    /// Tenant the decision was scoped to, when known.
    tenant_id: Option<String>,
    /// Permission key being checked, for `permission_check` events.
    permission: Option<String>,
    /// Human-readable reason for a denial.
    reason: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allowed-decision event.
    #[must_use]
    pub fn allowed(event: &'static str, subject: Option<String>, tenant_id: Option<String>) -> Self {
        Self { event, decision: "allow", subject, tenant_id, permission: None, reason: None }
    }

    /// Builds a denied-decision event.
    #[must_use]
    pub fn denied(
        event: &'static str,
        subject: Option<String>,
        tenant_id: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self { event, decision: "deny", subject, tenant_id, permission: None, reason: Some(reason.into()) }
    }

    /// Attaches the permission key under check.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Destination for [`AuthAuditEvent`]s.
pub trait AuthAuditSink: Send + Sync {
    /// Records one auth audit event.
    fn record(&self, event: &AuthAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Writes each event as a JSON line to stderr.
pub struct StderrAuditSink;

impl AuthAuditSink for StderrAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// Discards every event. Used in tests and for deployments that route
/// auth audit elsewhere.
pub struct NoopAuditSink;

impl AuthAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthAuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::AuthAuditEvent;
    use super::AuthAuditSink;
    use super::NoopAuditSink;

    #[test]
    fn noop_sink_accepts_any_event_without_panicking() {
        let event = AuthAuditEvent::denied("login", Some("user@example.com".to_string()), None, "bad password");
        NoopAuditSink.record(&event);
    }

    #[test]
    fn denied_event_carries_permission_when_attached() {
        let event = AuthAuditEvent::denied("permission_check", None, None, "missing permission")
            .with_permission("plan.publish");
        assert_eq!(event.permission.as_deref(), Some("plan.publish"));
    }
}
