//! Output formatting for review reports

pub mod console;
