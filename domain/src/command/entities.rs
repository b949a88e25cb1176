//! Command entities and the command status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Lifecycle status of a command.
///
/// `Pending -> Processing -> {Completed | Failed | Cancelled | TimedOut}`,
/// with `Pending -> {Cancelled | TimedOut}` for commands that never reach
/// the head of their queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Processing => "processing",
            CommandStatus::Completed => "completed",
            CommandStatus::Failed => "failed",
            CommandStatus::Cancelled => "cancelled",
            CommandStatus::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommandStatus::Completed
                | CommandStatus::Failed
                | CommandStatus::Cancelled
                | CommandStatus::TimedOut
        )
    }

    /// Whether the state machine permits moving to `next`
    pub fn can_transition_to(&self, next: CommandStatus) -> bool {
        use CommandStatus::*;
        match (self, next) {
            (Pending, Processing) => true,
            (Pending, Cancelled) => true,
            (Pending, TimedOut) => true,
            (Processing, Completed) => true,
            (Processing, Failed) => true,
            (Processing, TimedOut) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A natural-language command issued against one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub status: CommandStatus,
}

impl Command {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            document_id: document_id.into(),
            user_id: user_id.into(),
            text: text.into(),
            created_at,
            status: CommandStatus::Pending,
        }
    }

    /// Transition to `next`, enforcing the state machine
    pub fn transition_to(&mut self, next: CommandStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// A command as held by the per-document queue.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub command: Command,
    pub retry_count: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(command: Command, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            command,
            retry_count: 0,
            enqueued_at,
        }
    }
}
