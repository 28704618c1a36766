//! Phases of a review run.

use serde::{Deserialize, Serialize};

/// Phase of a review run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Optional single-agent summary of the change.
    Summary,
    /// Parallel fan-out agents.
    FanOut,
    /// Single aggregating agent.
    FanIn,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Summary => "summary",
            Phase::FanOut => "fan_out",
            Phase::FanIn => "fan_in",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Summary => "Summary",
            Phase::FanOut => "Parallel Review",
            Phase::FanIn => "Aggregation",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
