//! Queue observer port
//!
//! The per-document queue notifies observers on every state transition with
//! the current queue contents and head, so UI affordances like
//! position-in-queue can be derived without polling internal state.

use serde::{Deserialize, Serialize};

/// Queue contents at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub document_id: String,
    /// Command currently processing, if any
    pub processing: Option<String>,
    /// Pending command ids in execution order
    pub pending: Vec<String>,
}

impl QueueSnapshot {
    /// Zero-based queue position of a pending command
    pub fn position_of(&self, command_id: &str) -> Option<usize> {
        self.pending.iter().position(|id| id == command_id)
    }
}

/// Observer notified on every queue state transition.
pub trait QueueObserverPort: Send + Sync {
    fn on_queue_changed(&self, snapshot: &QueueSnapshot);
}

/// No-op observer
pub struct NoQueueObserver;

impl QueueObserverPort for NoQueueObserver {
    fn on_queue_changed(&self, _snapshot: &QueueSnapshot) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_lookup() {
        let snapshot = QueueSnapshot {
            document_id: "doc-1".to_string(),
            processing: Some("cmd-1".to_string()),
            pending: vec!["cmd-2".to_string(), "cmd-3".to_string()],
        };

        assert_eq!(snapshot.position_of("cmd-2"), Some(0));
        assert_eq!(snapshot.position_of("cmd-3"), Some(1));
        assert_eq!(snapshot.position_of("cmd-1"), None);
    }
}
