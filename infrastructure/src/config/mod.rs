//! Configuration file loading for prismatic
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PRISMATIC_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./prismatic.toml` or `./.prismatic.toml`
//! 4. Global: `$XDG_CONFIG_HOME/prismatic/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, DEFAULT_REVIEW_TOOLS, FileAgentConfig, FileConfig,
    FileGenerationConfig, FileProviderConfig, FileRetryConfig, FileReviewConfig, Severity,
};
pub use loader::ConfigLoader;
