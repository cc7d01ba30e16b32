//! Append-only audit sink collaborator.
//!
//! The core writes one entry per row/sweep failure and one end-of-run
//! summary; it never reads entries back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub source: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Fire-and-forget audit log. Sinks must not fail the caller.
pub trait AuditSink {
    fn record(&mut self, source: &str, message: &str);
}

/// Collects entries in memory, inspectable after a run
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Vec<AuditEntry>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, source: &str, message: &str) {
        self.entries.push(AuditEntry {
            source: source.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        });
    }
}

/// Forwards entries to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&mut self, source: &str, message: &str) {
        log::info!(target: "rostersync::audit", "{}: {}", source, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_entries_in_order() {
        let mut sink = MemoryAuditSink::new();
        sink.record("person_sync", "first");
        sink.record("person_sync", "second");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.entries()[0].message, "first");
        assert_eq!(sink.entries()[1].source, "person_sync");
    }
}
