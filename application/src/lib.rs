//! Application layer for prismatic
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::RetryPolicy;
pub use ports::{
    completion_provider::{
        CompletionProvider, CompletionRequest, ProviderError, ProviderFactory, SharedProvider,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, ProgressNotifier},
    tool_executor::{NoTools, ToolExecutorPort},
};
pub use use_cases::conversation_engine::{ConversationEngine, EngineRun, EngineStop};
pub use use_cases::retrying_provider::{RetryingProvider, Transient, retry_async, retry_blocking};
pub use use_cases::run_review::{ReviewReport, RunReviewError, RunReviewInput, RunReviewUseCase};
pub use use_cases::scatter_gather::{
    ScatterGatherError, ScatterGatherOutput, ScatterGatherUseCase,
};
