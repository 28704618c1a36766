//! Generation parameters: per-run conversation loop control.

use serde::{Deserialize, Serialize};

/// Parameters supplied by the caller for one conversation run.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Model identifier; `None` lets the provider pick its default.
    pub model: Option<String>,
    /// Hard cap on output tokens per call.
    pub max_tokens: u32,
    /// Hard cap on model calls (tool-use round trips) per run.
    pub max_iterations: usize,
    /// Strings that terminate generation early.
    pub stop_sequences: Vec<String>,
    /// Keep history in the engine across runs.
    pub use_history: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4000,
            max_iterations: 40,
            stop_sequences: Vec::new(),
            use_history: false,
        }
    }
}

impl GenerationParams {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.stop_sequences = sequences;
        self
    }

    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }
}
