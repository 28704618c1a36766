//! Application-level configuration.
//!
//! - [`RetryPolicy`] - backoff schedule for transient provider failures

pub mod retry_policy;

pub use retry_policy::RetryPolicy;
