//! Provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// Anthropic Messages API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// Model used when `[generation].model` is unset.
    pub model: String,
    /// HTTP timeout per request.
    pub timeout_secs: Option<u64>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
            model: "claude-3-7-sonnet-latest".to_string(),
            timeout_secs: Some(600),
        }
    }
}

impl FileProviderConfig {
    /// Resolve the API key: explicit value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }
}
