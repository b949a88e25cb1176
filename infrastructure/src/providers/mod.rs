//! Reasoning service adapters.

pub mod anthropic;

pub use anthropic::AnthropicBackend;
