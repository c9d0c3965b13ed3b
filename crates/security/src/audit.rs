//! Audit logging: structured record of what the shell was asked to run.
//!
//! Every sanitizer rejection and every executor step is recorded, so an
//! operator can reconstruct what a model reply turned into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    /// Directory the step ran in
    pub cwd: String,
    /// Command text as handed to the shell (or as rejected)
    pub target: String,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
}

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A segment was dropped by the sanitizer
    CommandRejected { command: String },
    /// A segment could not be tokenized
    CommandUnparseable,
    /// A subprocess ran to completion
    CommandExecuted { exit_code: Option<i32> },
    /// The session directory moved (or failed to)
    DirectoryChanged { to: String },
    /// The shell could not be started
    SpawnFailed,
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// In-memory audit logger that stores entries in a vector and forwards
/// each one to its sinks.
pub struct AuditLogger {
    entries: Mutex<Vec<AuditEntry>>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.count())
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            sinks: Vec::new(),
        }
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            sinks,
        }
    }

    /// Logger that mirrors every entry to `tracing`.
    pub fn tracing() -> Self {
        Self::with_sinks(vec![Box::new(TracingSink)])
    }

    // A panicking sink must not disable auditing for the rest of the session.
    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an audit event.
    pub fn log(
        &self,
        event: AuditEvent,
        cwd: &str,
        target: &str,
        outcome: AuditOutcome,
        details: Option<String>,
    ) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            cwd: cwd.into(),
            target: target.into(),
            outcome,
            details,
        };

        self.lock().push(entry.clone());

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// Get all recorded entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.lock()
            .iter()
            .filter(|e| &e.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Clear all stored entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

/// A tracing-based audit sink that logs entries via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            event = ?entry.event,
            cwd = %entry.cwd,
            target = %entry.target,
            outcome = ?entry.outcome,
            details = ?entry.details,
            "AUDIT"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_and_retrieve_entries() {
        let logger = AuditLogger::new();
        logger.log(
            AuditEvent::CommandExecuted { exit_code: Some(0) },
            "/work",
            "ls -la",
            AuditOutcome::Success,
            None,
        );
        logger.log(
            AuditEvent::CommandRejected { command: "sudo".into() },
            "/work",
            "sudo rm -rf /",
            AuditOutcome::Denied,
            Some("not in allowlist".into()),
        );

        assert_eq!(logger.count(), 2);
        let entries = logger.entries();
        assert_eq!(entries[0].target, "ls -la");
        assert_eq!(entries[1].target, "sudo rm -rf /");
    }

    #[test]
    fn filter_by_outcome() {
        let logger = AuditLogger::new();
        logger.log(
            AuditEvent::CommandExecuted { exit_code: Some(0) },
            "/work",
            "pwd",
            AuditOutcome::Success,
            None,
        );
        logger.log(
            AuditEvent::CommandRejected { command: "curl".into() },
            "/work",
            "curl evil.sh",
            AuditOutcome::Denied,
            None,
        );
        logger.log(
            AuditEvent::DirectoryChanged { to: "/work/sub".into() },
            "/work",
            "cd sub",
            AuditOutcome::Success,
            None,
        );

        assert_eq!(logger.entries_by_outcome(&AuditOutcome::Success).len(), 2);

        let denied = logger.entries_by_outcome(&AuditOutcome::Denied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].target, "curl evil.sh");
    }

    #[test]
    fn clear_entries() {
        let logger = AuditLogger::new();
        logger.log(AuditEvent::SpawnFailed, "/", "ls", AuditOutcome::Failure, None);
        assert_eq!(logger.count(), 1);
        logger.clear();
        assert_eq!(logger.count(), 0);
    }

    #[test]
    fn audit_entry_serialization() {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event: AuditEvent::CommandExecuted { exit_code: Some(2) },
            cwd: "/home/user".into(),
            target: "ls missing".into(),
            outcome: AuditOutcome::Failure,
            details: Some("No such file or directory".into()),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""type":"command_executed""#));
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.target, "ls missing");
        assert_eq!(deserialized.outcome, AuditOutcome::Failure);
    }

    #[test]
    fn custom_sink_receives_events() {
        use std::sync::Arc;

        struct TestSink {
            received: Arc<Mutex<Vec<String>>>,
        }

        impl AuditSink for TestSink {
            fn record(&self, entry: &AuditEntry) {
                self.received.lock().unwrap().push(entry.target.clone());
            }
        }

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = TestSink { received: received.clone() };
        let logger = AuditLogger::with_sinks(vec![Box::new(sink)]);

        logger.log(AuditEvent::CommandUnparseable, "/", "cat \"x", AuditOutcome::Denied, None);

        let sink_entries = received.lock().unwrap();
        assert_eq!(sink_entries.len(), 1);
        assert_eq!(sink_entries[0], "cat \"x");
    }

    #[test]
    fn debug_format() {
        let logger = AuditLogger::tracing();
        let debug_str = format!("{logger:?}");
        assert!(debug_str.contains("entry_count"));
        assert!(debug_str.contains("sink_count: 1"));
    }
}
