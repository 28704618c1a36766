//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types on demand.

mod generation;
mod provider;
mod retry;
mod review;

pub use generation::FileGenerationConfig;
pub use provider::FileProviderConfig;
pub use retry::FileRetryConfig;
pub use review::{DEFAULT_REVIEW_TOOLS, FileAgentConfig, FileReviewConfig};

use prismatic_domain::{AgentSpec, DomainError, ScatterGatherJob};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("retry.max_attempts cannot be 0")]
    ZeroAttempts,

    #[error("{field} ({value}) is not a valid duration in seconds")]
    InvalidWait { field: &'static str, value: String },

    #[error("retry.min_wait_secs ({min}) is greater than retry.max_wait_secs ({max})")]
    InvertedWaits { min: String, max: String },

    #[error("generation.max_iterations cannot be 0")]
    ZeroIterations,

    #[error("review.reviewers is empty")]
    NoReviewers,

    #[error("duplicate agent name '{0}' in [review]")]
    DuplicateAgentName(String),

    #[error("unknown reviewer role '{0}'")]
    UnknownRole(String),

    #[error("review agent needs a name or a role")]
    MissingAgentName,

    #[error("review agent '{0}' needs an instruction or a role")]
    MissingInstruction(String),

    #[error("invalid review panel: {0}")]
    InvalidPanel(#[from] DomainError),
}

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub error: ConfigValidationError,
}

impl ConfigIssue {
    fn error(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    fn warning(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub generation: FileGenerationConfig,
    pub retry: FileRetryConfig,
    pub provider: FileProviderConfig,
    pub review: FileReviewConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.retry.max_attempts == 0 {
            // Treated as a single attempt
            issues.push(ConfigIssue::warning(ConfigValidationError::ZeroAttempts));
        }
        let invalid_waits = self.retry.invalid_waits();
        for &(field, value) in &invalid_waits {
            issues.push(ConfigIssue::error(ConfigValidationError::InvalidWait {
                field,
                value: value.to_string(),
            }));
        }
        if invalid_waits.is_empty() && self.retry.min_wait_secs > self.retry.max_wait_secs {
            issues.push(ConfigIssue::error(ConfigValidationError::InvertedWaits {
                min: self.retry.min_wait_secs.to_string(),
                max: self.retry.max_wait_secs.to_string(),
            }));
        }
        if self.generation.max_iterations == 0 {
            issues.push(ConfigIssue::error(ConfigValidationError::ZeroIterations));
        }

        let reviewers = self.review.reviewer_entries();
        if reviewers.is_empty() {
            issues.push(ConfigIssue::error(ConfigValidationError::NoReviewers));
        }

        let mut names = HashSet::new();
        let mut resolved: Vec<Result<AgentSpec, ConfigValidationError>> = reviewers
            .iter()
            .map(|r| r.to_agent_spec(None, &self.review.tools))
            .collect();
        resolved.push(self.review.aggregator_spec());
        for spec in resolved {
            match spec {
                Ok(spec) => {
                    if !names.insert(spec.name().to_string()) {
                        issues.push(ConfigIssue::error(
                            ConfigValidationError::DuplicateAgentName(spec.name().to_string()),
                        ));
                    }
                }
                Err(e) => issues.push(ConfigIssue::error(e)),
            }
        }
        if self.review.summarize
            && let Err(e) = self.review.summarizer_spec()
        {
            issues.push(ConfigIssue::error(e));
        }

        issues
    }

    /// Build the reviewer panel as a scatter-gather job.
    pub fn review_job(&self) -> Result<ScatterGatherJob, ConfigValidationError> {
        let fan_out = self.review.reviewer_specs()?;
        if fan_out.is_empty() {
            return Err(ConfigValidationError::NoReviewers);
        }
        let fan_in = self.review.aggregator_spec()?;
        Ok(ScatterGatherJob::new(fan_in, fan_out, self.generation_params())?)
    }

    /// The summarizer agent, when summarization is enabled.
    pub fn summarizer(&self) -> Result<Option<AgentSpec>, ConfigValidationError> {
        if !self.review.summarize {
            return Ok(None);
        }
        self.review.summarizer_spec().map(Some)
    }

    /// Generation parameters with the provider's model as fallback.
    pub fn generation_params(&self) -> prismatic_domain::GenerationParams {
        let params = self.generation.to_params();
        if params.model.is_some() {
            params
        } else {
            params.with_model(self.provider.model.clone())
        }
    }
}
