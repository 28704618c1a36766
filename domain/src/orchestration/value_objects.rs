//! Orchestration value objects: immutable result types for scatter-gather runs.
//!
//! - [`AgentOutput`] - Final text and usage of one fan-out agent
//! - [`compose_fan_in_message`] - Labeled concatenation fed to the fan-in agent

use crate::conversation::response::Usage;
use serde::{Deserialize, Serialize};

/// Header line of the composite fan-in message.
pub const FAN_IN_HEADER: &str = "Aggregated responses from multiple agents:";

/// Output of one fan-out agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Agent name
    pub agent: String,
    /// Last text block of the agent's last turn
    pub text: String,
    /// Number of model calls the agent made
    pub turns: usize,
    /// Summed token usage
    pub usage: Usage,
}

impl AgentOutput {
    pub fn new(agent: impl Into<String>, text: impl Into<String>, turns: usize, usage: Usage) -> Self {
        Self {
            agent: agent.into(),
            text: text.into(),
            turns,
            usage,
        }
    }
}

/// Concatenate fan-out outputs, labeled by agent name, in the given order.
///
/// ```
/// use prismatic_domain::orchestration::value_objects::{AgentOutput, compose_fan_in_message};
/// use prismatic_domain::Usage;
///
/// let message = compose_fan_in_message(&[
///     AgentOutput::new("security", "No issues.", 1, Usage::default()),
/// ]);
/// assert!(message.contains("## Agent: security\n\nNo issues."));
/// ```
pub fn compose_fan_in_message(outputs: &[AgentOutput]) -> String {
    let sections: Vec<String> = outputs
        .iter()
        .map(|o| format!("## Agent: {}\n\n{}", o.agent, o.text))
        .collect();
    format!("{}\n\n{}", FAN_IN_HEADER, sections.join("\n\n"))
}
