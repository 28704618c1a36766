//! Conversation domain.
//!
//! - [`message`]: messages, content blocks and cache markers
//! - [`response`]: provider turn results, stop reasons and usage
//! - [`params`]: per-run generation parameters
//! - [`state`]: engine-owned message history
//! - [`cache`]: prompt-cache annotation policy

pub mod cache;
pub mod message;
pub mod params;
pub mod response;
pub mod state;
