//! Structured, append-only JSONL event logging — a durable domain audit
//! trail, distinct from `tracing` diagnostics. Modeled on the teacher's
//! shared-mutable-state convention (guard shared state behind a lock) but
//! applied to a file handle instead of an in-memory collection.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;

/// Append-only structured event sink. `emit` must never block the caller on
/// anything beyond a local write — no network I/O, no retries.
pub trait EventSink: Send + Sync {
    fn emit(&self, event_name: &str, payload: Value);
}

/// Discards every event. Useful for tests and for callers that don't want
/// an audit trail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event_name: &str, _payload: Value) {}
}

/// Appends one JSON object per line to a file, guarded by a mutex so
/// concurrent callers cannot interleave partial writes. Ordering across
/// writers is not guaranteed, matching the spec.
pub struct JsonlEventSink {
    file: Mutex<File>,
}

impl JsonlEventSink {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for JsonlEventSink {
    fn emit(&self, event_name: &str, payload: Value) {
        let mut record = serde_json::Map::new();
        record.insert("event".to_string(), Value::String(event_name.to_string()));
        record.insert(
            "logged_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        if let Value::Object(fields) = payload {
            for (k, v) in fields {
                record.insert(k, v);
            }
        }
        let line = match serde_json::to_string(&Value::Object(record)) {
            Ok(line) => line,
            Err(_) => return,
        };

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// An in-memory sink, used by tests that assert on emitted events.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event_name: &str, payload: Value) {
        self.events.lock().unwrap().push((event_name.to_string(), payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingEventSink::new();
        sink.emit("zone_identified", serde_json::json!({"symbol": "AAPL"}));
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "zone_identified");
    }

    #[test]
    fn jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = JsonlEventSink::open(&path).unwrap();
        sink.emit("target_calculated", serde_json::json!({"symbol": "AAPL", "adjusted_target": "139.50"}));
        sink.emit("target_calculated", serde_json::json!({"symbol": "MSFT", "adjusted_target": "310.00"}));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "target_calculated");
        assert_eq!(first["adjusted_target"], "139.50");
    }
}
