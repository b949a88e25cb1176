//! JSONL writer for command lifecycle events.
//!
//! Each event is serialized as a single JSON line with a `type` field and
//! `timestamp`, appended via a buffered writer. The same logger doubles as a
//! queue observer, so queue transitions land in the same stream as command
//! lifecycle events.

use easel_application::ports::command_log::{CommandLogEvent, CommandLogPort};
use easel_application::ports::queue_observer::{QueueObserverPort, QueueSnapshot};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Command logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes per event — JSONL is
/// append-only, so a crash loses at most the event being written.
pub struct JsonlCommandLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlCommandLogger {
    /// Create a logger appending to `path`.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create command log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open command log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, event_type: &str, payload: serde_json::Value) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = if let serde_json::Value::Object(mut map) = payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event_type,
                "timestamp": timestamp,
                "data": payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl CommandLogPort for JsonlCommandLogger {
    fn log(&self, event: CommandLogEvent) {
        self.write_record(event.event_type, event.payload);
    }
}

impl QueueObserverPort for JsonlCommandLogger {
    fn on_queue_changed(&self, snapshot: &QueueSnapshot) {
        self.write_record(
            "queue_changed",
            serde_json::json!({
                "document_id": snapshot.document_id,
                "processing": snapshot.processing,
                "pending": snapshot.pending,
            }),
        );
    }
}

impl Drop for JsonlCommandLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
