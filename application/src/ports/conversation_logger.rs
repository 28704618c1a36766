//! Transcript logging port
//!
//! `tracing` carries the operator-facing diagnostics. This port carries the
//! transcript itself: every model turn, tool round trip and fan-in seed as a
//! machine-readable record, so a review can be replayed or audited later.

use serde_json::Value;

/// Event type names written by the engine and the orchestrator.
pub mod kind {
    /// One provider response (stop reason, usage, content).
    pub const LLM_TURN: &str = "llm_turn";
    /// A tool-use request about to be dispatched.
    pub const TOOL_CALL: &str = "tool_call";
    /// Outcome of a dispatched tool.
    pub const TOOL_RESULT: &str = "tool_result";
    /// A provider failure that ended an engine loop.
    pub const PROVIDER_ERROR: &str = "provider_error";
    /// End of one engine run.
    pub const AGENT_FINISHED: &str = "agent_finished";
    /// The composite message handed to the fan-in agent.
    pub const FAN_IN_SEED: &str = "fan_in_seed";
}

/// One transcript record before the adapter stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for transcript records.
///
/// `log` cannot fail: adapters deal with their own I/O errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every record.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
