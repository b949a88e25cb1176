//! Anthropic Messages API adapter for the reasoning backend port.
//!
//! One HTTP POST per reasoning call; the transcript is rebuilt every call
//! because the API is stateless. Classification of HTTP failures into the
//! gateway error classes happens here; retry/backoff stays in the
//! application-layer [`ReasoningClient`](easel_application::ReasoningClient).

use async_trait::async_trait;
use easel_application::ports::reasoning::{
    GatewayError, ReasoningBackend, ReasoningReply, ReasoningRequest,
};
use std::time::Duration;
use tracing::debug;

use super::types;
use crate::config::ProviderConfig;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Reasoning backend over the Anthropic Messages API.
pub struct AnthropicBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            max_tokens: 2048,
        }
    }

    /// Build from file configuration, resolving the API key from the
    /// configured environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::Unauthenticated
        })?;
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("failed to build HTTP client"),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningBackend for AnthropicBackend {
    async fn complete(&self, request: &ReasoningRequest) -> Result<ReasoningReply, GatewayError> {
        let body = types::MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &request.system,
            messages: types::build_messages(request),
            tools: request.catalog.clone(),
        };

        debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Calling reasoning service"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::ServerError(error.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<types::ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(types::classify_status(status, message));
        }

        let parsed: types::MessagesResponse = response.json().await.map_err(|error| {
            GatewayError::MalformedReply(format!("response body did not parse: {}", error))
        })?;
        types::parse_response(parsed)
    }
}
