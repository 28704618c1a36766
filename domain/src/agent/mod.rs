//! Agent domain: immutable agent role descriptions.

pub mod spec;
