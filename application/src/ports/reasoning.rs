//! Reasoning backend port
//!
//! Defines the interface to the external reasoning service: one call taking
//! a transcript plus the operation catalog, returning assistant text and
//! zero or more structured operation calls. Adapters live in the
//! infrastructure layer; retry/backoff lives in
//! [`ReasoningClient`](crate::gateway::ReasoningClient).

use async_trait::async_trait;
use easel_domain::OperationCall;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the reasoning service, classified for retry policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Reasoning service rate limited the request")]
    RateLimited,

    #[error("Authentication with the reasoning service failed")]
    Unauthenticated,

    #[error("Reasoning request was rejected as malformed: {0}")]
    BadRequest(String),

    #[error("Reasoning service error: {0}")]
    ServerError(String),

    #[error("Reasoning request timed out")]
    Timeout,

    #[error("Reasoning service returned a malformed reply: {0}")]
    MalformedReply(String),
}

impl GatewayError {
    /// The message shown to the user once retries are exhausted.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::RateLimited => "The reasoning service is rate limited; try again shortly",
            GatewayError::Unauthenticated => "Authentication with the reasoning service failed",
            GatewayError::BadRequest(_) => "The reasoning request could not be constructed",
            GatewayError::ServerError(_) | GatewayError::Timeout => {
                "The reasoning service is temporarily unavailable"
            }
            GatewayError::MalformedReply(_) => {
                "The reasoning service returned an unusable response"
            }
        }
    }
}

/// Speaker of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior conversation message (non-iteration path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

impl TranscriptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token accounting reported by the reasoning service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate another call's usage into this one
    pub fn absorb(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Rendered result of one executed operation, fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Wire id of the call this result answers, when the service assigned one
    pub call_id: Option<String>,
    pub operation: String,
    pub output: String,
}

/// One completed reason-act-observe round of the current command.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub assistant_text: String,
    pub calls: Vec<OperationCall>,
    pub results: Vec<ToolOutcome>,
}

/// A fully assembled reasoning request.
///
/// When `iterations` is non-empty the transcript is
/// `[system, user_text, ...iterations]` — iteration state fully replaces
/// prior-conversation replay. Backends must render history via
/// [`effective_history`](Self::effective_history) so the replacement rule
/// cannot be bypassed.
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    pub system: String,
    pub history: Vec<TranscriptMessage>,
    pub user_text: String,
    pub iterations: Vec<IterationRecord>,
    /// Wire operation catalog attached to the call
    pub catalog: Vec<serde_json::Value>,
}

impl ReasoningRequest {
    /// Prior conversation to replay: empty whenever iteration state exists.
    pub fn effective_history(&self) -> &[TranscriptMessage] {
        if self.iterations.is_empty() {
            &self.history
        } else {
            &[]
        }
    }
}

/// The reasoning service's answer to one request.
#[derive(Debug, Clone)]
pub struct ReasoningReply {
    pub text: String,
    pub calls: Vec<OperationCall>,
    pub usage: TokenUsage,
}

/// Port to the external reasoning service.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// One transcript-in, reply-out call. No retries at this level.
    async fn complete(&self, request: &ReasoningRequest) -> Result<ReasoningReply, GatewayError>;
}
