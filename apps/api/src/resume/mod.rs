pub mod analyzer;
pub mod extraction;
pub mod handlers;
pub mod prompts;
