//! Retry wrapper for completion providers.
//!
//! Transient failures (rate limiting, overload, unavailability) are retried
//! according to a [`RetryPolicy`]; any other failure is returned at once.

use crate::config::RetryPolicy;
use crate::ports::completion_provider::{CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use prismatic_domain::TurnResult;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Errors that know whether retrying them can help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for ProviderError {
    fn is_transient(&self) -> bool {
        ProviderError::is_transient(self)
    }
}

/// Run `op` until it succeeds, fails fatally, or the attempt cap is reached.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && policy.should_retry(attempt) => {
                let wait = policy.wait_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt,
                    policy.max_attempts,
                    e,
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Blocking form of [`retry_async`] for callers outside a runtime.
pub fn retry_blocking<T, E, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Transient + Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && policy.should_retry(attempt) => {
                let wait = policy.wait_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt,
                    policy.max_attempts,
                    e,
                    wait.as_secs_f64()
                );
                std::thread::sleep(wait);
            }
            Err(e) => return Err(e),
        }
    }
}

/// A [`CompletionProvider`] that retries transient failures of another one.
pub struct RetryingProvider {
    inner: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn CompletionProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl CompletionProvider for RetryingProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<TurnResult, ProviderError> {
        let inner: &dyn CompletionProvider = self.inner.as_ref();
        retry_async(&self.policy, "Completion call", move || inner.generate(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, request};
    use std::time::Duration;

    fn rate_limited() -> Result<TurnResult, ProviderError> {
        Err(ProviderError::RateLimited("429".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors_until_success() {
        let inner = Arc::new(ScriptedProvider::new(vec![
            rate_limited(),
            Err(ProviderError::Overloaded("529".to_string())),
            Err(ProviderError::Unavailable("503".to_string())),
            rate_limited(),
            Ok(TurnResult::from_text("finally")),
        ]));
        let provider = RetryingProvider::new(
            inner.clone(),
            RetryPolicy::default().with_jitter(false),
        );

        let start = tokio::time::Instant::now();
        let turn = provider.generate(&request()).await.unwrap();

        assert_eq!(turn.last_text(), Some("finally"));
        assert_eq!(inner.calls(), 5);
        // 30 + 30 + 60 + 120
        assert!(start.elapsed() >= Duration::from_secs(240));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let inner = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Api {
                status: 400,
                message: "bad request".to_string(),
            }),
            Ok(TurnResult::from_text("unreachable")),
        ]));
        let provider = RetryingProvider::new(inner.clone(), RetryPolicy::default());

        let start = tokio::time::Instant::now();
        let err = provider.generate(&request()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 400, .. }));
        assert_eq!(inner.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let inner = Arc::new(ScriptedProvider::new((0..6).map(|_| rate_limited()).collect()));
        let provider = RetryingProvider::new(inner.clone(), RetryPolicy::default());

        let err = provider.generate(&request()).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(inner.calls(), 5);
    }

    #[test]
    fn test_blocking_retry_counts_attempts() {
        let policy = RetryPolicy::default()
            .with_jitter(false)
            .with_waits(Duration::ZERO, Duration::ZERO, Duration::ZERO);
        let mut calls = 0;

        let result: Result<u32, ProviderError> = retry_blocking(&policy, "op", || {
            calls += 1;
            if calls < 3 {
                Err(ProviderError::Overloaded("busy".to_string()))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_blocking_retry_stops_on_fatal() {
        let policy = RetryPolicy::default();
        let mut calls = 0;

        let result: Result<(), ProviderError> = retry_blocking(&policy, "op", || {
            calls += 1;
            Err(ProviderError::Decode("eof".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
