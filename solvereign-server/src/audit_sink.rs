// solvereign-server/src/audit_sink.rs
// ============================================================================
// Module: Operational Audit Sink
// Description: Structured mirror of every append to the governance audit log.
// Purpose: Implements C16's sink seam, generalized over solvereign_core::AuditEvent.
// Dependencies: solvereign-core, serde_json
// ============================================================================

//! ## Overview
//! Every call to [`solvereign_core::AuditLogStore::append`] is mirrored
//! through one [`AuditSink`], independent of the durable hash chain itself.
//! This is an operational logging seam, not the audit log's source of
//! truth: losing a sink write never loses the chained row in the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use solvereign_core::AuditEvent;

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Destination for a mirrored [`AuditEvent`].
pub trait AuditSink: Send + Sync {
    /// Records one audit event. Must never block the request path on a
    /// slow or unreachable downstream; implementations swallow their own
    /// I/O errors rather than propagate them.
    fn record(&self, event: &AuditEvent);
}

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Audit sink that logs one JSON line per event to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Audit sink that appends one JSON line per event to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log mirror file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let _ = writeln!(file, "{payload}");
        let _ = file.flush();
    }
}

// ============================================================================
// SECTION: Noop Sink
// ============================================================================

/// Audit sink that discards every event, for tests and tooling.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}
