//! Orchestrator parameters — loop and queue control.
//!
//! Groups the static parameters that bound one command's blast radius:
//! reasoning iterations, queue admission, pending wait budget, and the
//! executor's inter-mutation pacing. Application-layer concerns, not domain
//! policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds for the orchestration loop and the per-document queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Maximum reason-act-observe iterations per command
    pub max_iterations: usize,
    /// Maximum pending commands per document
    pub queue_capacity: usize,
    /// Wall-clock budget a command may spend pending
    pub pending_timeout: Duration,
    /// Settle delay between successive mutations in one batch
    pub op_pacing: Duration,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            queue_capacity: 5,
            pending_timeout: Duration::from_secs(30),
            op_pacing: Duration::from_millis(120),
        }
    }
}

impl OrchestratorParams {
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = timeout;
        self
    }

    pub fn with_op_pacing(mut self, pacing: Duration) -> Self {
        self.op_pacing = pacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = OrchestratorParams::default();
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.queue_capacity, 5);
        assert_eq!(params.pending_timeout, Duration::from_secs(30));
        assert_eq!(params.op_pacing, Duration::from_millis(120));
    }

    #[test]
    fn test_builder() {
        let params = OrchestratorParams::default()
            .with_max_iterations(3)
            .with_queue_capacity(10)
            .with_op_pacing(Duration::ZERO);

        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.queue_capacity, 10);
        assert_eq!(params.op_pacing, Duration::ZERO);
    }
}
