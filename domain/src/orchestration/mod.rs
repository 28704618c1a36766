//! Orchestration domain: scatter-gather jobs, phases and results.

pub mod job;
pub mod phase;
pub mod value_objects;
