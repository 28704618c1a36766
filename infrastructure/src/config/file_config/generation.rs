//! Generation configuration from TOML (`[generation]` section)

use prismatic_domain::GenerationParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Model identifier sent to the provider (falls back to `[provider].model`).
    pub model: Option<String>,
    /// Max tokens per model turn.
    pub max_tokens: u32,
    /// Max model calls per agent run.
    pub max_iterations: usize,
    pub stop_sequences: Vec<String>,
    /// Keep each engine's history between runs.
    pub use_history: bool,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            model: params.model,
            max_tokens: params.max_tokens,
            max_iterations: params.max_iterations,
            stop_sequences: params.stop_sequences,
            use_history: params.use_history,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_params(&self) -> GenerationParams {
        let mut params = GenerationParams::default()
            .with_max_tokens(self.max_tokens)
            .with_max_iterations(self.max_iterations)
            .with_stop_sequences(self.stop_sequences.clone())
            .with_history(self.use_history);
        if let Some(model) = &self.model {
            params = params.with_model(model.clone());
        }
        params
    }
}
