//! Application use cases
//!
//! - [`conversation_engine`] - one agent's tool-using conversation loop
//! - [`retrying_provider`] - backoff for transient provider failures
//! - [`scatter_gather`] - parallel fan-out followed by a single fan-in
//! - [`run_review`] - summary phase plus a reviewer panel

pub mod conversation_engine;
pub mod retrying_provider;
pub mod run_review;
pub mod scatter_gather;
