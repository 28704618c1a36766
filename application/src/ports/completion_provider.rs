//! Completion Provider port
//!
//! Defines the interface for calling a tool-using language model. One call
//! produces one [`TurnResult`]. Errors are classified so callers can tell
//! transient failures (worth retrying) from fatal ones.

use async_trait::async_trait;
use prismatic_domain::{AgentSpec, GenerationParams, Message, SystemBlock, ToolDefinition, TurnResult};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during a completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service overloaded: {0}")]
    Overloaded(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Rate-limit, overload and unavailability are transient; everything else is fatal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_)
                | ProviderError::Overloaded(_)
                | ProviderError::Unavailable(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::Overloaded(_) => "overloaded",
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::Api { .. } => "api",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::Transport(_) => "transport",
            ProviderError::Decode(_) => "decode",
            ProviderError::Other(_) => "other",
        }
    }
}

/// Everything one completion call needs.
///
/// `messages` and `tools` share their elements with the engine's history
/// and catalog; only cache-annotated tails are fresh allocations.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Vec<SystemBlock>,
    pub messages: Vec<Arc<Message>>,
    pub tools: Vec<Arc<ToolDefinition>>,
    pub params: GenerationParams,
}

/// Port for a tool-using completion model
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce one model turn for the request.
    async fn generate(&self, request: &CompletionRequest) -> Result<TurnResult, ProviderError>;
}

/// Creates the provider each agent talks to.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, agent: &AgentSpec) -> Arc<dyn CompletionProvider>;
}

/// Factory handing every agent the same provider.
pub struct SharedProvider(pub Arc<dyn CompletionProvider>);

impl ProviderFactory for SharedProvider {
    fn create(&self, _agent: &AgentSpec) -> Arc<dyn CompletionProvider> {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::RateLimited("429".into()).is_transient());
        assert!(ProviderError::Overloaded("529".into()).is_transient());
        assert!(ProviderError::Unavailable("503".into()).is_transient());

        assert!(!ProviderError::Api { status: 400, message: "bad".into() }.is_transient());
        assert!(!ProviderError::InvalidRequest("x".into()).is_transient());
        assert!(!ProviderError::Transport("reset".into()).is_transient());
        assert!(!ProviderError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(error.to_string(), "API error (401): invalid x-api-key");
        assert_eq!(error.kind(), "api");
    }
}
