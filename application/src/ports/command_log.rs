//! Command log port
//!
//! Structured lifecycle events for offline inspection. This is an
//! observability stream, not a durable job log — events may be dropped
//! without affecting command processing.

use serde_json::Value;

/// One command lifecycle event.
#[derive(Debug, Clone)]
pub struct CommandLogEvent {
    /// Event type (e.g. "command_received", "command_completed")
    pub event_type: &'static str,
    /// Event payload, merged into the logged record
    pub payload: Value,
}

impl CommandLogEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for command lifecycle events.
pub trait CommandLogPort: Send + Sync {
    fn log(&self, event: CommandLogEvent);
}

/// No-op logger
pub struct NoCommandLog;

impl CommandLogPort for NoCommandLog {
    fn log(&self, _event: CommandLogEvent) {}
}
