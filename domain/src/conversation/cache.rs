//! Prompt-cache annotation policy.
//!
//! Before every provider call the engine marks three tails as cacheable:
//!
//! | Sequence | Marked element |
//! |----------|----------------|
//! | Tool catalog | last tool definition |
//! | System instruction | last system block |
//! | Message history | last content block of the last message |
//!
//! Only the tail element is rebuilt. Earlier elements are shared (`Arc`
//! clones for tools and messages) and never touched. Reapplying the policy to
//! an already-marked tail leaves it unchanged.

use super::message::{CacheControl, Message, SystemBlock};
use crate::tool::entities::ToolDefinition;
use std::sync::Arc;

/// Marker used for every annotation.
pub const CACHE_MARKER: CacheControl = CacheControl::Ephemeral;

/// Mark the last tool definition as cacheable.
pub fn annotate_tools(tools: &[Arc<ToolDefinition>]) -> Vec<Arc<ToolDefinition>> {
    let mut annotated = tools.to_vec();
    if let Some(last) = annotated.last_mut()
        && last.cache_control != Some(CACHE_MARKER)
    {
        *last = Arc::new((**last).clone().with_cache_control(CACHE_MARKER));
    }
    annotated
}

/// Mark the last system block as cacheable.
pub fn annotate_system(blocks: &[SystemBlock]) -> Vec<SystemBlock> {
    let mut annotated = blocks.to_vec();
    if let Some(last) = annotated.last_mut() {
        last.cache_control = Some(CACHE_MARKER);
    }
    annotated
}

/// Mark the last content block of the last message as cacheable.
///
/// A trailing message without content blocks is left as is.
pub fn annotate_messages(messages: &[Arc<Message>]) -> Vec<Arc<Message>> {
    let mut annotated = messages.to_vec();
    if let Some(last) = annotated.last_mut()
        && let Some(block) = last.last_block()
        && block.cache_control() != Some(CACHE_MARKER)
    {
        let mut message = (**last).clone();
        if let Some(tail) = message.content.pop() {
            message.content.push(tail.with_cache_control(CACHE_MARKER));
        }
        *last = Arc::new(message);
    }
    annotated
}
