//! Agent specifications.

use crate::conversation::message::SystemBlock;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Immutable description of one agent role.
///
/// An agent has a name (unique within an orchestration run), a system
/// instruction, and the set of tool names it may invoke.
///
/// # Examples
///
/// ```
/// use prismatic_domain::AgentSpec;
///
/// let spec = AgentSpec::new("security_reviewer", "You review code for vulnerabilities.")
///     .with_tools(["read_file", "grep_search"]);
/// assert!(spec.allows_tool("read_file"));
/// assert!(!spec.allows_tool("write_file"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    name: String,
    instruction: String,
    tools: BTreeSet<String>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            tools: BTreeSet::new(),
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tools(&self) -> &BTreeSet<String> {
        &self.tools
    }

    pub fn allows_tool(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// System instruction as provider blocks. Empty instruction → no blocks.
    pub fn system_blocks(&self) -> Vec<SystemBlock> {
        if self.instruction.trim().is_empty() {
            Vec::new()
        } else {
            vec![SystemBlock::new(self.instruction.clone())]
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidAgent(
                "agent name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
