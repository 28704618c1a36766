//! Model turn results.
//!
//! A [`TurnResult`] is one completion provider response: the content blocks
//! the model produced, why it stopped, and the token usage of the call.
//!
//! # Extracting output
//!
//! ```text
//! final_text(turns)       → last text block of the last turn
//! full_transcript(turns)  → every text block + "[Calling tool ...]" lines
//! ```

use super::message::{ContentBlock, Message};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Reason the model stopped generating.
///
/// `ToolUse` drives the multi-turn loop; every other reason ends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response: the model is done.
    EndTurn,
    /// A configured stop sequence was generated.
    StopSequence,
    /// Hit the token limit: response may be truncated.
    MaxTokens,
    /// The model wants to call tools: execute them and return results.
    ToolUse,
    /// Provider-specific stop reason.
    Other(String),
}

impl StopReason {
    /// Parse a provider stop reason string.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "end_turn" => StopReason::EndTurn,
            "stop_sequence" => StopReason::StopSequence,
            "max_tokens" => StopReason::MaxTokens,
            "tool_use" => StopReason::ToolUse,
            other => StopReason::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::StopSequence => "stop_sequence",
            StopReason::MaxTokens => "max_tokens",
            StopReason::ToolUse => "tool_use",
            StopReason::Other(s) => s,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token counters reported for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
}

impl Usage {
    /// Sum the usage of every turn.
    pub fn total(turns: &[TurnResult]) -> Usage {
        turns.iter().map(|t| t.usage).fold(Usage::default(), Add::add)
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
            cache_creation_input_tokens: self.cache_creation_input_tokens
                + rhs.cache_creation_input_tokens,
            cache_read_input_tokens: self.cache_read_input_tokens + rhs.cache_read_input_tokens,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = *self + rhs;
    }
}

/// One completion provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    #[serde(default)]
    pub usage: Usage,
    /// Model identifier (if returned by the provider).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TurnResult {
    /// A text-only turn that ended naturally.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
            model: None,
        }
    }

    /// The last text block of this turn, if any.
    pub fn last_text(&self) -> Option<&str> {
        self.content.iter().rev().find_map(ContentBlock::as_text)
    }

    /// Tool use blocks in emission order.
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str, &serde_json::Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use)
    }

    pub fn has_tool_use(&self) -> bool {
        self.tool_uses().next().is_some()
    }

    /// The assistant message this turn contributes to history.
    pub fn to_message(&self) -> Message {
        Message::assistant(self.content.clone())
    }
}

/// Final textual output of a run: the last text block of the last turn.
///
/// Returns an empty string when the last turn carries no text.
pub fn final_text(turns: &[TurnResult]) -> String {
    turns
        .last()
        .and_then(TurnResult::last_text)
        .unwrap_or_default()
        .to_string()
}

/// Full transcript of a run: every text block, with tool calls rendered inline.
pub fn full_transcript(turns: &[TurnResult]) -> String {
    let mut lines = Vec::new();
    for turn in turns {
        for block in &turn.content {
            match block {
                ContentBlock::Text { text, .. } => lines.push(text.clone()),
                ContentBlock::ToolUse { name, input, .. } => {
                    lines.push(format!("[Calling tool {} with args {}]", name, input))
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }
    }
    lines.join("\n")
}
