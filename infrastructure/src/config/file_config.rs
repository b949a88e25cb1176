//! File configuration structure.
//!
//! Every section has serde defaults, so a partial `easel.toml` only
//! overrides what it names.

use easel_application::OrchestratorParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: ProviderConfig,
    pub orchestrator: OrchestratorConfig,
    pub logging: LoggingConfig,
}

/// Reasoning service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model identifier sent to the service
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 2048,
            request_timeout_secs: 60,
        }
    }
}

/// Loop and queue bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_iterations: usize,
    pub queue_capacity: usize,
    pub pending_timeout_secs: u64,
    pub op_pacing_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            queue_capacity: 5,
            pending_timeout_secs: 30,
            op_pacing_ms: 120,
        }
    }
}

impl OrchestratorConfig {
    pub fn to_params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_max_iterations(self.max_iterations)
            .with_queue_capacity(self.queue_capacity)
            .with_pending_timeout(Duration::from_secs(self.pending_timeout_secs))
            .with_op_pacing(Duration::from_millis(self.op_pacing_ms))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSONL command lifecycle log; disabled when unset
    pub command_log: Option<PathBuf>,
}
