//! Command processor port and the stable error taxonomy.
//!
//! The per-document queue drives a [`CommandProcessor`] when a command
//! reaches the head of its queue; the orchestration loop is the production
//! implementation. The [`ErrorKind`] taxonomy here is the one every failure
//! reaching the command boundary is mapped onto.

use async_trait::async_trait;
use easel_domain::{Command, ExecutionResult};
use serde::{Deserialize, Serialize};

use super::reasoning::{TokenUsage, TranscriptMessage};

/// Stable error kinds exposed at the command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidRequest,
    AuthenticationRequired,
    DocumentNotFound,
    ValidationError,
    Timeout,
    UpstreamUnavailable,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid-request",
            ErrorKind::AuthenticationRequired => "authentication-required",
            ErrorKind::DocumentNotFound => "document-not-found",
            ErrorKind::ValidationError => "validation-error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UpstreamUnavailable => "upstream-unavailable",
            ErrorKind::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A terminal failure with its stable kind and user-facing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFailure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl CommandFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// A command plus the conversation context it was submitted with.
#[derive(Debug, Clone)]
pub struct CommandJob {
    pub command: Command,
    pub history: Vec<TranscriptMessage>,
}

impl CommandJob {
    pub fn new(command: Command, history: Vec<TranscriptMessage>) -> Self {
        Self { command, history }
    }
}

/// Terminal result of processing one command.
///
/// `failure: None` means the command completed; otherwise the failure
/// carries the stable kind and message. `results` always reflects what was
/// actually applied, including the partially applied operations of a failed
/// mutation batch.
#[derive(Debug, Clone)]
pub struct CommandVerdict {
    pub assistant_text: String,
    pub results: Vec<ExecutionResult>,
    pub usage: TokenUsage,
    pub failure: Option<CommandFailure>,
}

impl CommandVerdict {
    pub fn success(
        assistant_text: impl Into<String>,
        results: Vec<ExecutionResult>,
        usage: TokenUsage,
    ) -> Self {
        Self {
            assistant_text: assistant_text.into(),
            results,
            usage,
            failure: None,
        }
    }

    pub fn failed(
        failure: CommandFailure,
        assistant_text: impl Into<String>,
        results: Vec<ExecutionResult>,
        usage: TokenUsage,
    ) -> Self {
        Self {
            assistant_text: assistant_text.into(),
            results,
            usage,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Port the queue drives once a command reaches the head.
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    async fn process(&self, job: &CommandJob) -> CommandVerdict;
}
