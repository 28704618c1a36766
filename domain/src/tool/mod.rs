//! Tool domain: catalog entries and execution outcomes.

pub mod entities;
pub mod value_objects;
