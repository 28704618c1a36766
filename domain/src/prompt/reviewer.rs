//! Built-in reviewer roles.

use super::template::PromptTemplate;
use crate::agent::spec::AgentSpec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Agent roles of the default review panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Summarizer,
    Security,
    Performance,
    Clarity,
    Test,
    Aggregator,
}

impl ReviewerRole {
    /// Fan-out roles in panel order.
    pub const FAN_OUT: [ReviewerRole; 4] = [
        ReviewerRole::Security,
        ReviewerRole::Performance,
        ReviewerRole::Clarity,
        ReviewerRole::Test,
    ];

    pub fn agent_name(&self) -> &'static str {
        match self {
            ReviewerRole::Summarizer => "change_summarizer",
            ReviewerRole::Security => "security_reviewer",
            ReviewerRole::Performance => "performance_reviewer",
            ReviewerRole::Clarity => "clarity_reviewer",
            ReviewerRole::Test => "test_reviewer",
            ReviewerRole::Aggregator => "review_aggregator",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ReviewerRole::Summarizer => PromptTemplate::summarizer_system(),
            ReviewerRole::Security => PromptTemplate::security_system(),
            ReviewerRole::Performance => PromptTemplate::performance_system(),
            ReviewerRole::Clarity => PromptTemplate::clarity_system(),
            ReviewerRole::Test => PromptTemplate::test_system(),
            ReviewerRole::Aggregator => PromptTemplate::aggregator_system(),
        }
    }

    /// Agent spec for this role with the given tool names.
    pub fn agent_spec<I, S>(&self, tools: I) -> AgentSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AgentSpec::new(self.agent_name(), self.instruction()).with_tools(tools)
    }
}

impl FromStr for ReviewerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summarizer" | "change_summarizer" => Ok(ReviewerRole::Summarizer),
            "security" | "security_reviewer" => Ok(ReviewerRole::Security),
            "performance" | "performance_reviewer" => Ok(ReviewerRole::Performance),
            "clarity" | "clarity_reviewer" => Ok(ReviewerRole::Clarity),
            "test" | "test_reviewer" => Ok(ReviewerRole::Test),
            "aggregator" | "review_aggregator" => Ok(ReviewerRole::Aggregator),
            other => Err(format!("unknown reviewer role: {}", other)),
        }
    }
}
