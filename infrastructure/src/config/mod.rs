//! Configuration loading (figment-based, TOML sources).

pub mod file_config;
pub mod loader;

pub use file_config::{FileConfig, LoggingConfig, OrchestratorConfig, ProviderConfig};
pub use loader::{ConfigError, ConfigLoader};
