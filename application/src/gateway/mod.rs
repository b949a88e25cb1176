//! Reasoning client: retry and backoff around the backend port.
//!
//! Retry policy, per call attempt and independent of the orchestration-loop
//! iteration count:
//!
//! | Error class | Retry? | Backoff |
//! |-------------|--------|---------|
//! | Rate limited | yes | 2s, then 4s |
//! | Transient / server / timeout | yes | 1s, then 2s |
//! | Unauthenticated / bad request / malformed reply | no | - |
//!
//! At most [`MAX_ATTEMPTS`] attempts; the last error is returned once they
//! are exhausted. Backoff is invisible to the caller except as latency.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ports::reasoning::{GatewayError, ReasoningBackend, ReasoningReply, ReasoningRequest};

/// Attempts per gateway call, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff before retrying `attempt + 1`, or `None` if the class never retries.
///
/// `attempt` is 1-based; delays double per attempt from the class base.
fn backoff_delay(error: &GatewayError, attempt: u32) -> Option<Duration> {
    let base = match error {
        GatewayError::RateLimited => Duration::from_secs(2),
        GatewayError::ServerError(_) | GatewayError::Timeout => Duration::from_secs(1),
        GatewayError::Unauthenticated
        | GatewayError::BadRequest(_)
        | GatewayError::MalformedReply(_) => return None,
    };
    Some(base * 2u32.saturating_pow(attempt - 1))
}

/// Gateway to the reasoning service with the retry policy applied.
pub struct ReasoningClient<B: ReasoningBackend> {
    backend: Arc<B>,
    max_attempts: u32,
}

impl<B: ReasoningBackend> ReasoningClient<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Override the attempt budget (tests)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Issue one reasoning call, retrying retryable failures with backoff.
    pub async fn call(&self, request: &ReasoningRequest) -> Result<ReasoningReply, GatewayError> {
        let mut attempt = 1;
        loop {
            match self.backend.complete(request).await {
                Ok(reply) => {
                    debug!(
                        attempt,
                        calls = reply.calls.len(),
                        input_tokens = reply.usage.input_tokens,
                        output_tokens = reply.usage.output_tokens,
                        "Reasoning call succeeded"
                    );
                    return Ok(reply);
                }
                Err(error) => {
                    let Some(delay) = backoff_delay(&error, attempt) else {
                        return Err(error);
                    };
                    if attempt >= self.max_attempts {
                        warn!(attempt, %error, "Reasoning call failed, attempts exhausted");
                        return Err(error);
                    }
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "Reasoning call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::reasoning::TokenUsage;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Backend returning scripted results in order
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<ReasoningReply, GatewayError>>>,
        attempts: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<ReasoningReply, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                attempts: Mutex::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            *self.attempts.lock().unwrap()
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        async fn complete(
            &self,
            _request: &ReasoningRequest,
        ) -> Result<ReasoningReply, GatewayError> {
            *self.attempts.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::ServerError("script exhausted".to_string())))
        }
    }

    fn ok_reply() -> Result<ReasoningReply, GatewayError> {
        Ok(ReasoningReply {
            text: "done".to_string(),
            calls: vec![],
            usage: TokenUsage::new(10, 2),
        })
    }

    fn request() -> ReasoningRequest {
        ReasoningRequest {
            system: "sys".to_string(),
            history: vec![],
            user_text: "hello".to_string(),
            iterations: vec![],
            catalog: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_backs_off_two_then_four_seconds() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(GatewayError::RateLimited),
            Err(GatewayError::RateLimited),
            ok_reply(),
        ]));
        let client = ReasoningClient::new(backend.clone());

        let started = Instant::now();
        let reply = client.call(&request()).await.unwrap();

        assert_eq!(reply.text, "done");
        assert_eq!(backend.attempts(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_back_off_one_then_two_seconds() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(GatewayError::ServerError("503".to_string())),
            Err(GatewayError::Timeout),
            ok_reply(),
        ]));
        let client = ReasoningClient::new(backend.clone());

        let started = Instant::now();
        client.call(&request()).await.unwrap();

        assert_eq!(backend.attempts(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhaustion_returns_rate_limited() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(GatewayError::RateLimited),
            Err(GatewayError::RateLimited),
            Err(GatewayError::RateLimited),
        ]));
        let client = ReasoningClient::new(backend.clone());

        let started = Instant::now();
        let error = client.call(&request()).await.unwrap_err();

        assert_eq!(error, GatewayError::RateLimited);
        assert_eq!(backend.attempts(), 3);
        // Two backoffs happened before the final attempt failed
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn authentication_errors_never_retry() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(GatewayError::Unauthenticated)]));
        let client = ReasoningClient::new(backend.clone());

        let started = Instant::now();
        let error = client.call(&request()).await.unwrap_err();

        assert_eq!(error, GatewayError::Unauthenticated);
        assert_eq!(backend.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_reply_never_retries() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(GatewayError::MalformedReply(
            "bad params".to_string(),
        ))]));
        let client = ReasoningClient::new(backend.clone());

        let error = client.call(&request()).await.unwrap_err();
        assert!(matches!(error, GatewayError::MalformedReply(_)));
        assert_eq!(backend.attempts(), 1);
    }

    #[test]
    fn backoff_schedule() {
        assert_eq!(
            backoff_delay(&GatewayError::RateLimited, 1),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            backoff_delay(&GatewayError::RateLimited, 2),
            Some(Duration::from_secs(4))
        );
        assert_eq!(
            backoff_delay(&GatewayError::Timeout, 1),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            backoff_delay(&GatewayError::ServerError("x".to_string()), 2),
            Some(Duration::from_secs(2))
        );
        assert_eq!(backoff_delay(&GatewayError::Unauthenticated, 1), None);
        assert_eq!(
            backoff_delay(&GatewayError::BadRequest("x".to_string()), 1),
            None
        );
    }
}
