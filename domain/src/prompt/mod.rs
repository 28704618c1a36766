//! Prompt domain: review prompt templates and built-in reviewer roles.

pub mod reviewer;
pub mod template;

pub use reviewer::ReviewerRole;
pub use template::PromptTemplate;
