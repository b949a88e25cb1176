//! Wire types for the Anthropic Messages API.
//!
//! The API is stateless: every call carries the full transcript. The
//! builders here render a [`ReasoningRequest`] into wire messages —
//! iteration rounds become assistant `tool_use` blocks answered by user
//! `tool_result` blocks — and parse the response back into a
//! [`ReasoningReply`].

use easel_application::ports::reasoning::{
    GatewayError, ReasoningReply, ReasoningRequest, Role, TokenUsage,
};
use easel_domain::OperationCall;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct WireMessage {
    pub role: &'static str,
    pub content: Vec<WireBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Deserialize)]
pub(super) struct MessagesResponse {
    pub content: Vec<WireBlock>,
    pub usage: WireUsage,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

/// Stable wire id for call `index` of an iteration when the service
/// assigned none.
fn fallback_call_id(index: usize) -> String {
    format!("call-{}", index)
}

/// Render the transcript: `[history?, user_text, ...iteration rounds]`.
///
/// `effective_history` is empty whenever iteration rounds exist, so the
/// iteration path is exactly `[user_text, assistant tool_use, user
/// tool_result, ...]`.
pub(super) fn build_messages(request: &ReasoningRequest) -> Vec<WireMessage> {
    let mut messages = Vec::new();

    for message in request.effective_history() {
        messages.push(WireMessage {
            role: match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: vec![WireBlock::Text {
                text: message.content.clone(),
            }],
        });
    }

    messages.push(WireMessage {
        role: "user",
        content: vec![WireBlock::Text {
            text: request.user_text.clone(),
        }],
    });

    for iteration in &request.iterations {
        let mut assistant = Vec::new();
        if !iteration.assistant_text.is_empty() {
            assistant.push(WireBlock::Text {
                text: iteration.assistant_text.clone(),
            });
        }
        for (index, call) in iteration.calls.iter().enumerate() {
            assistant.push(WireBlock::ToolUse {
                id: call
                    .call_id
                    .clone()
                    .unwrap_or_else(|| fallback_call_id(index)),
                name: call.name.clone(),
                input: serde_json::json!(call.arguments),
            });
        }
        messages.push(WireMessage {
            role: "assistant",
            content: assistant,
        });

        let results = iteration
            .results
            .iter()
            .enumerate()
            .map(|(index, outcome)| WireBlock::ToolResult {
                tool_use_id: outcome
                    .call_id
                    .clone()
                    .unwrap_or_else(|| fallback_call_id(index)),
                content: outcome.output.clone(),
            })
            .collect();
        messages.push(WireMessage {
            role: "user",
            content: results,
        });
    }

    messages
}

/// Parse a successful response body into a reply.
///
/// A `tool_use` block whose `input` is not a JSON object is a parse failure
/// and aborts the whole call — malformed operations are never silently
/// dropped.
pub(super) fn parse_response(response: MessagesResponse) -> Result<ReasoningReply, GatewayError> {
    let mut text = String::new();
    let mut calls = Vec::new();

    for block in response.content {
        match block {
            WireBlock::Text { text: chunk } => text.push_str(&chunk),
            WireBlock::ToolUse { id, name, input } => {
                let serde_json::Value::Object(arguments) = input else {
                    return Err(GatewayError::MalformedReply(format!(
                        "tool_use {} has non-object input",
                        name
                    )));
                };
                calls.push(OperationCall {
                    name,
                    call_id: Some(id),
                    arguments: arguments.into_iter().collect(),
                });
            }
            WireBlock::ToolResult { .. } => {
                return Err(GatewayError::MalformedReply(
                    "unexpected tool_result block in assistant response".to_string(),
                ));
            }
        }
    }

    Ok(ReasoningReply {
        text,
        calls,
        usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
    })
}

/// Map an HTTP status plus error body to the gateway error classes.
pub(super) fn classify_status(status: u16, message: String) -> GatewayError {
    match status {
        429 => GatewayError::RateLimited,
        401 | 403 => GatewayError::Unauthenticated,
        400 | 404 | 422 => GatewayError::BadRequest(message),
        408 => GatewayError::Timeout,
        _ => GatewayError::ServerError(format!("HTTP {}: {}", status, message)),
    }
}
