//! Domain layer for prismatic
//!
//! This crate contains the core data model: agents, conversations, tools and
//! scatter-gather jobs. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! An agent talks to a completion provider in turns. Each [`TurnResult`]
//! either ends the conversation or asks for tools; tool results are sent back
//! as a new [`Message`] until the model stops or the iteration cap is hit.
//!
//! ## Scatter-Gather
//!
//! A [`ScatterGatherJob`] runs several fan-out agents on the same input in
//! parallel, then feeds their labeled outputs to one fan-in agent.

pub mod agent;
pub mod conversation;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use agent::spec::AgentSpec;
pub use conversation::{
    cache::{annotate_messages, annotate_system, annotate_tools},
    message::{CacheControl, ContentBlock, Message, Role, SystemBlock},
    params::GenerationParams,
    response::{StopReason, TurnResult, Usage, final_text, full_transcript},
    state::ConversationState,
};
pub use core::error::DomainError;
pub use orchestration::{
    job::ScatterGatherJob,
    phase::Phase,
    value_objects::{AgentOutput, compose_fan_in_message},
};
pub use prompt::{PromptTemplate, ReviewerRole};
pub use tool::{
    entities::{ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolOutput},
};
