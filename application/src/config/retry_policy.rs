//! Retry policy for transient provider failures.

use rand::Rng;
use std::time::Duration;

/// Exponential backoff with a floor, a ceiling and optional jitter.
///
/// The wait before retry `n` (1-based) is
/// `clamp(multiplier * 2^(n-1), min_wait, max_wait)`, plus up to a quarter
/// of that when jitter is on, never exceeding `max_wait`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            multiplier: Duration::from_secs(15),
            min_wait: Duration::from_secs(30),
            max_wait: Duration::from_secs(180),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_waits(mut self, multiplier: Duration, min: Duration, max: Duration) -> Self {
        self.multiplier = multiplier;
        self.min_wait = min;
        self.max_wait = max.max(min);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether another attempt is allowed after `attempt` calls have failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Deterministic part of the wait after the `attempt`-th failure.
    pub fn base_wait(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.clamp(self.min_wait, self.max_wait.max(self.min_wait))
    }

    /// Wait after the `attempt`-th failure, jitter included.
    pub fn wait_for(&self, attempt: u32) -> Duration {
        let base = self.base_wait(attempt);
        if !self.jitter {
            return base;
        }
        let spread = base.as_millis() as u64 / 4;
        let extra = if spread == 0 {
            0
        } else {
            rand::rng().random_range(0..=spread)
        };
        (base + Duration::from_millis(extra)).min(self.max_wait.max(self.min_wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_without_jitter() {
        let policy = RetryPolicy::default().with_jitter(false);
        let waits: Vec<u64> = (1..=5).map(|a| policy.wait_for(a).as_secs()).collect();
        // 15 -> floor 30, 30, 60, 120, 240 -> ceiling 180
        assert_eq!(waits, vec![30, 30, 60, 120, 180]);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 1..=8 {
            let base = policy.base_wait(attempt);
            for _ in 0..50 {
                let wait = policy.wait_for(attempt);
                assert!(wait >= base);
                assert!(wait <= base + base / 4);
                assert!(wait <= policy.max_wait);
            }
        }
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = RetryPolicy::default().with_jitter(false);
        assert_eq!(policy.wait_for(u32::MAX), Duration::from_secs(180));
    }

    #[test]
    fn test_should_retry_respects_attempt_cap() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(4));
        assert!(!policy.should_retry(5));
        assert!(!RetryPolicy::none().should_retry(1));
    }

    #[test]
    fn test_max_attempts_never_below_one() {
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts, 1);
    }
}
