//! Chat-completions collaborator for URL suggestion and sentiment.

pub mod groq;
pub mod prompts;

pub use groq::{GroqApiError, GroqClient};
