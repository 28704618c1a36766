//! Local tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! Runs the read-only file and search tools against a [`Workspace`] root.
//! Tool bodies do blocking file I/O, so each invocation runs on tokio's
//! blocking pool.

use super::{Workspace, file, read_only_tool_definitions, search};
use async_trait::async_trait;
use prismatic_application::ports::tool_executor::ToolExecutorPort;
use prismatic_domain::{ToolDefinition, ToolError, ToolOutput};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Executor that runs tools on the local machine.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    workspace: Workspace,
    definitions: Vec<ToolDefinition>,
}

impl LocalToolExecutor {
    /// Executor with every built-in tool, rooted at the current directory.
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new("."),
            definitions: read_only_tool_definitions(),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace = Workspace::new(dir);
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn execute_internal(workspace: &Workspace, name: &str, arguments: &Value) -> ToolOutput {
        match name {
            file::READ_FILE => file::execute_read_file(workspace, arguments),
            file::LIST_DIRECTORY => file::execute_list_directory(workspace, arguments),
            search::GLOB_SEARCH => search::execute_glob_search(workspace, arguments),
            search::GREP_SEARCH => search::execute_grep_search(workspace, arguments),
            _ => ToolOutput::failure(ToolError::not_found(format!("Unknown tool: {}", name))),
        }
    }
}

impl Default for LocalToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    async fn list_tools(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }

    async fn invoke(&self, name: &str, arguments: &Value) -> ToolOutput {
        if !self.definitions.iter().any(|d| d.name == name) {
            return ToolOutput::failure(ToolError::not_found(format!("Unknown tool: {}", name)));
        }

        debug!("Executing tool {} with {}", name, arguments);
        let workspace = self.workspace.clone();
        let tool = name.to_string();
        let arguments = arguments.clone();

        let output = tokio::task::spawn_blocking(move || {
            Self::execute_internal(&workspace, &tool, &arguments)
        })
        .await
        .unwrap_or_else(|e| {
            ToolOutput::failure(ToolError::execution_failed(format!(
                "Tool task failed: {}",
                e
            )))
        });

        if output.is_error {
            warn!("Tool {} failed: {}", name, output.content);
        }
        output
    }
}
