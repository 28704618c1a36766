//! Completion provider adapters.

pub mod anthropic;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
