//! Model invoker trait
//!
//! The loop only needs one thing from a model backend: given the conversation
//! so far and the available tools, return the model's next piece of text.

use async_trait::async_trait;

use crate::agent::Conversation;
use crate::core::{ModelError, ToolDescription};

/// Options for a single generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Backend that produces the model's next message
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Ask the model what to do next. Failures are fatal to the run.
    async fn invoke(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescription],
    ) -> Result<String, ModelError>;

    /// Name of the backend, for logging
    fn name(&self) -> &str;
}
