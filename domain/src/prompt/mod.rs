//! Prompt domain
//!
//! Templates for the prompts sent at each stage of a council run.

mod template;

pub use template::PromptTemplate;
