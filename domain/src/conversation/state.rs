//! Per-engine conversation state.

use super::message::Message;
use std::sync::Arc;

/// Message history owned by exactly one conversation engine.
///
/// Messages are held behind `Arc` so a request can reference the history
/// without copying it; only the cache-annotated tail is rebuilt per call.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Arc<Message>>,
    preserve_history: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the last run asked for its history to be kept.
    pub fn preserves_history(&self) -> bool {
        self.preserve_history
    }

    /// Keep `messages` as the history for the next run.
    pub fn commit(&mut self, messages: Vec<Arc<Message>>) {
        self.messages = messages;
        self.preserve_history = true;
    }

    /// Drop any kept history.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.preserve_history = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_clear() {
        let mut state = ConversationState::new();
        assert!(state.is_empty());
        assert!(!state.preserves_history());

        state.commit(vec![Arc::new(Message::user("hi"))]);
        assert_eq!(state.len(), 1);
        assert!(state.preserves_history());

        state.clear();
        assert!(state.is_empty());
        assert!(!state.preserves_history());
    }
}
