//! Tool Executor port
//!
//! Defines the interface for enumerating and invoking tools supplied by the
//! host environment (file access, search, ...).

use async_trait::async_trait;
use prismatic_domain::{ToolDefinition, ToolError, ToolOutput};

/// Port for tool execution
///
/// A failing tool returns an error-flagged [`ToolOutput`]; it never panics
/// or returns `Err`, because the model is expected to react to the failure.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Enumerate the tools currently available.
    async fn list_tools(&self) -> Vec<ToolDefinition>;

    /// Invoke a tool by name with JSON arguments.
    async fn invoke(&self, name: &str, arguments: &serde_json::Value) -> ToolOutput;
}

/// Executor with an empty catalog, for agents that only produce text.
pub struct NoTools;

#[async_trait]
impl ToolExecutorPort for NoTools {
    async fn list_tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    async fn invoke(&self, name: &str, _arguments: &serde_json::Value) -> ToolOutput {
        ToolOutput::failure(ToolError::not_found(format!("tool '{}'", name)))
    }
}
