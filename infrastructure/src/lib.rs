//! Infrastructure layer for prismatic
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig, FileProviderConfig, Severity,
};
pub use logging::JsonlConversationLogger;
pub use providers::{AnthropicConfig, AnthropicProvider};
pub use tools::{LocalToolExecutor, Workspace, read_only_tool_definitions};
