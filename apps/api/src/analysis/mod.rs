//! The analysis pipeline: intake, prompt assembly, and result extraction
//! around the single model call.

pub mod assemble;
pub mod document;
pub mod extract;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod prompts;
pub mod sanitize;
