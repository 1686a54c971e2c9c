//! Structured error log used by collaborators that must not fail loudly
//!
//! Undo/redo replay reports each failing command here and keeps going.

use std::cell::RefCell;

use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One entry in the error log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub severity: Severity,
    /// Error class, e.g. `ReplayFailure`
    pub kind: String,
    pub message: String,
    pub context: serde_json::Value,
}

impl LogRecord {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: kind.into(),
            message: message.into(),
            context: serde_json::Value::Null,
        }
    }

    pub fn warning(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// Destination for [`LogRecord`]s
pub trait LogSink {
    fn log(&self, record: LogRecord);
}

/// Forwards records to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, record: LogRecord) {
        match record.severity {
            Severity::Error => error!(
                kind = %record.kind,
                context = %record.context,
                "{}",
                record.message
            ),
            Severity::Warning => warn!(
                kind = %record.kind,
                context = %record.context,
                "{}",
                record.message
            ),
        }
    }
}

/// Keeps records in memory, e.g. for an in-app error panel
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RefCell<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, record: LogRecord) {
        self.records.borrow_mut().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.log(LogRecord::warning("Stale", "thumbnail missing"));
        sink.log(
            LogRecord::error("ReplayFailure", "boom").with_context(json!({ "mode": "undoing" })),
        );
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::Warning);
        assert_eq!(records[1].context["mode"], json!("undoing"));

        sink.clear();
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_record_serializes_lowercase_severity() {
        let value = serde_json::to_value(LogRecord::error("NotFound", "gone")).unwrap();
        assert_eq!(value["severity"], json!("error"));
    }
}
