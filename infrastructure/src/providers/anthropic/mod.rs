//! Anthropic reasoning service adapter.

mod adapter;
mod types;

pub use adapter::AnthropicBackend;
