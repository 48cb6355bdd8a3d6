//! LLM module - model backends
//!
//! Provides the model invoker abstraction, prompt rendering, and the Ollama
//! implementation.

pub mod ollama;
pub mod prompt;
pub mod traits;

pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
pub use traits::{GenerateOptions, ModelInvoker};
