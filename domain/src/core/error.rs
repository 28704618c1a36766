//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Scatter-gather job has no fan-out agents")]
    EmptyFanOut,

    #[error("Duplicate agent name: {0}")]
    DuplicateAgentName(String),

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),
}
