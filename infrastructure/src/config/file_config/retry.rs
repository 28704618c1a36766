//! Retry configuration from TOML (`[retry]` section)

use prismatic_application::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Total attempts per provider call, the first one included.
    pub max_attempts: u32,
    pub multiplier_secs: f64,
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
    pub jitter: bool,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            multiplier_secs: policy.multiplier.as_secs_f64(),
            min_wait_secs: policy.min_wait.as_secs_f64(),
            max_wait_secs: policy.max_wait.as_secs_f64(),
            jitter: policy.jitter,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_waits(
                secs(self.multiplier_secs),
                secs(self.min_wait_secs),
                secs(self.max_wait_secs),
            )
            .with_jitter(self.jitter)
    }

    /// Wait settings that cannot be represented as a [`Duration`]
    /// (negative, NaN, infinite or too large).
    pub fn invalid_waits(&self) -> Vec<(&'static str, f64)> {
        [
            ("retry.multiplier_secs", self.multiplier_secs),
            ("retry.min_wait_secs", self.min_wait_secs),
            ("retry.max_wait_secs", self.max_wait_secs),
        ]
        .into_iter()
        .filter(|(_, value)| Duration::try_from_secs_f64(*value).is_err())
        .collect()
    }
}

/// Only reached for values `invalid_waits` reports; those become zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
