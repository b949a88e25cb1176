//! Command service — the inbound command boundary.
//!
//! Accepts a command request from the presentation layer, rejects malformed
//! input before queueing, mints the command id, submits to the per-document
//! queue, and maps every outcome onto the stable response shape: either a
//! success payload or `{kind, message, suggestions}`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use easel_domain::{Command, ExecutionResult};

use crate::config::OrchestratorParams;
use crate::ports::command_log::{CommandLogEvent, CommandLogPort, NoCommandLog};
use crate::ports::processor::{CommandProcessor, ErrorKind};
use crate::ports::queue_observer::QueueObserverPort;
use crate::ports::reasoning::{TokenUsage, TranscriptMessage};
use crate::queue::{CommandOutcome, CommandQueue, QueueConfig, QueueError};

/// Inbound command request.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub text: String,
    pub document_id: String,
    pub user_id: String,
    pub history: Vec<TranscriptMessage>,
}

impl CommandRequest {
    pub fn new(
        text: impl Into<String>,
        document_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            document_id: document_id.into(),
            user_id: user_id.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<TranscriptMessage>) -> Self {
        self.history = history;
        self
    }
}

/// Successful command response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSuccess {
    pub command_id: String,
    pub assistant_text: String,
    pub operations: Vec<ExecutionResult>,
    pub elapsed_ms: u64,
    pub usage: TokenUsage,
}

/// Failed command response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl CommandError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

pub type CommandResponse = Result<CommandSuccess, CommandError>;

/// The command boundary service.
pub struct CommandService<P: CommandProcessor + 'static> {
    queue: CommandQueue<P>,
    log: Arc<dyn CommandLogPort>,
    id_seq: AtomicU64,
}

impl<P: CommandProcessor + 'static> CommandService<P> {
    pub fn new(processor: Arc<P>, params: &OrchestratorParams) -> Self {
        let config = QueueConfig {
            capacity: params.queue_capacity,
            pending_timeout: params.pending_timeout,
        };
        Self {
            queue: CommandQueue::new(processor, config),
            log: Arc::new(NoCommandLog),
            id_seq: AtomicU64::new(0),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueueObserverPort>) -> Self {
        self.queue = self.queue.with_observer(observer);
        self
    }

    pub fn with_command_log(mut self, log: Arc<dyn CommandLogPort>) -> Self {
        self.log = log;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.queue = self.queue.with_cancellation(token);
        self
    }

    fn next_command_id(&self) -> String {
        let seq = self.id_seq.fetch_add(1, Ordering::Relaxed);
        format!("cmd-{}-{}", Utc::now().timestamp_millis(), seq)
    }

    /// Handle one command request to its terminal response.
    pub async fn handle(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();

        // Input errors are rejected before queueing and never retried
        if request.text.trim().is_empty() {
            return Err(CommandError::new(
                ErrorKind::InvalidRequest,
                "Command text must not be empty",
            ));
        }
        if request.document_id.is_empty() {
            return Err(CommandError::new(
                ErrorKind::InvalidRequest,
                "documentId is required",
            ));
        }
        if request.user_id.is_empty() {
            return Err(CommandError::new(
                ErrorKind::InvalidRequest,
                "userId is required",
            ));
        }

        let command = Command::new(
            self.next_command_id(),
            request.document_id.clone(),
            request.user_id.clone(),
            request.text.clone(),
            Utc::now(),
        );
        let command_id = command.id.clone();

        self.log.log(CommandLogEvent::new(
            "command_received",
            serde_json::json!({
                "command_id": command_id,
                "document_id": request.document_id,
                "user_id": request.user_id,
                "text": request.text,
            }),
        ));

        let outcome = self.queue.submit(command, request.history).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Ok(CommandOutcome::Finished(verdict)) => match verdict.failure {
                None => Ok(CommandSuccess {
                    command_id: command_id.clone(),
                    assistant_text: verdict.assistant_text,
                    operations: verdict.results,
                    elapsed_ms,
                    usage: verdict.usage,
                }),
                Some(failure) => Err(CommandError {
                    kind: failure.kind,
                    message: failure.message,
                    suggestions: failure.suggestions,
                }),
            },
            Ok(CommandOutcome::Cancelled) => Err(CommandError::new(
                ErrorKind::InvalidRequest,
                "Command was cancelled before processing",
            )),
            Ok(CommandOutcome::TimedOut) => Err(CommandError::new(
                ErrorKind::Timeout,
                "Command timed out waiting in the queue",
            )
            .with_suggestion("Retry once the document's queue drains")),
            Err(error @ QueueError::CapacityExceeded { .. }) => {
                Err(CommandError::new(ErrorKind::Timeout, error.to_string())
                    .with_suggestion("Wait for queued commands to finish and retry"))
            }
            Err(error) => Err(CommandError::new(ErrorKind::InternalError, error.to_string())),
        };

        match &response {
            Ok(success) => {
                info!(command_id = %command_id, elapsed_ms, "Command succeeded");
                self.log.log(CommandLogEvent::new(
                    "command_finished",
                    serde_json::json!({
                        "command_id": command_id,
                        "status": "completed",
                        "elapsed_ms": elapsed_ms,
                        "operations": success.operations.len(),
                    }),
                ));
            }
            Err(error) => {
                info!(
                    command_id = %command_id,
                    kind = %error.kind,
                    elapsed_ms,
                    "Command failed"
                );
                self.log.log(CommandLogEvent::new(
                    "command_finished",
                    serde_json::json!({
                        "command_id": command_id,
                        "status": "failed",
                        "kind": error.kind.as_str(),
                        "message": error.message,
                        "elapsed_ms": elapsed_ms,
                    }),
                ));
            }
        }

        response
    }

    /// Cancel a pending command on behalf of its originator.
    pub async fn cancel(
        &self,
        document_id: &str,
        command_id: &str,
        user_id: &str,
    ) -> Result<(), CommandError> {
        self.queue
            .cancel(document_id, command_id, user_id)
            .await
            .map_err(|error| match error {
                QueueError::NotCancellable(_)
                | QueueError::NotOriginator(_)
                | QueueError::UnknownCommand(_) => {
                    CommandError::new(ErrorKind::InvalidRequest, error.to_string())
                }
                other => CommandError::new(ErrorKind::InternalError, other.to_string()),
            })
    }
}
