pub mod evaluation;
pub mod handlers;
pub mod ideal;
pub mod prompts;
pub mod questions;
