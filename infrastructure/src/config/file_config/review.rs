//! Review panel configuration from TOML (`[review]` section)
//!
//! ```toml
//! [review]
//! summarize = true
//! tools = ["read_file", "grep_search"]
//!
//! [[review.reviewers]]
//! role = "security"
//!
//! [[review.reviewers]]
//! name = "license_reviewer"
//! instruction = "Check new dependencies for license problems."
//!
//! [review.aggregator]
//! instruction = "Summarize the reviews in five bullet points."
//! ```

use super::ConfigValidationError;
use prismatic_domain::{AgentSpec, ReviewerRole};
use serde::{Deserialize, Serialize};

/// Default tool set offered to every review agent.
pub const DEFAULT_REVIEW_TOOLS: [&str; 4] =
    ["read_file", "list_directory", "glob_search", "grep_search"];

/// One agent of the review pipeline.
///
/// `role` selects a built-in preset; the other fields override it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub role: Option<String>,
    pub name: Option<String>,
    pub instruction: Option<String>,
    /// Tool names this agent may call (defaults to `[review].tools`).
    pub tools: Option<Vec<String>>,
}

impl FileAgentConfig {
    pub fn from_role(role: ReviewerRole) -> Self {
        Self {
            role: Some(role.agent_name().to_string()),
            ..Self::default()
        }
    }

    /// Resolve into an [`AgentSpec`], falling back to `default_role` when no
    /// role is given.
    pub fn to_agent_spec(
        &self,
        default_role: Option<ReviewerRole>,
        default_tools: &[String],
    ) -> Result<AgentSpec, ConfigValidationError> {
        let role = match &self.role {
            Some(raw) => Some(
                raw.parse::<ReviewerRole>()
                    .map_err(|_| ConfigValidationError::UnknownRole(raw.clone()))?,
            ),
            None => default_role,
        };

        let name = self
            .name
            .clone()
            .or_else(|| role.map(|r| r.agent_name().to_string()))
            .ok_or(ConfigValidationError::MissingAgentName)?;
        let instruction = self
            .instruction
            .clone()
            .or_else(|| role.map(|r| r.instruction().to_string()))
            .ok_or_else(|| ConfigValidationError::MissingInstruction(name.clone()))?;
        let tools = self.tools.as_deref().unwrap_or(default_tools);

        Ok(AgentSpec::new(name, instruction).with_tools(tools.iter().cloned()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// Run the change summarizer before the panel.
    pub summarize: bool,
    /// Tools offered to agents without their own `tools` list.
    pub tools: Vec<String>,
    /// Fan-out reviewers; the built-in panel when unset.
    pub reviewers: Option<Vec<FileAgentConfig>>,
    pub aggregator: FileAgentConfig,
    pub summarizer: FileAgentConfig,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        Self {
            summarize: true,
            tools: DEFAULT_REVIEW_TOOLS.iter().map(|t| t.to_string()).collect(),
            reviewers: None,
            aggregator: FileAgentConfig::default(),
            summarizer: FileAgentConfig::default(),
        }
    }
}

impl FileReviewConfig {
    /// Reviewer entries, the built-in panel when none are configured.
    pub fn reviewer_entries(&self) -> Vec<FileAgentConfig> {
        match &self.reviewers {
            Some(reviewers) => reviewers.clone(),
            None => ReviewerRole::FAN_OUT
                .iter()
                .map(|r| FileAgentConfig::from_role(*r))
                .collect(),
        }
    }

    pub fn reviewer_specs(&self) -> Result<Vec<AgentSpec>, ConfigValidationError> {
        self.reviewer_entries()
            .iter()
            .map(|r| r.to_agent_spec(None, &self.tools))
            .collect()
    }

    pub fn aggregator_spec(&self) -> Result<AgentSpec, ConfigValidationError> {
        self.aggregator
            .to_agent_spec(Some(ReviewerRole::Aggregator), &self.tools)
    }

    pub fn summarizer_spec(&self) -> Result<AgentSpec, ConfigValidationError> {
        self.summarizer
            .to_agent_spec(Some(ReviewerRole::Summarizer), &self.tools)
    }
}
