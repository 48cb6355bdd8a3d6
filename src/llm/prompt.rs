//! Prompt rendering
//!
//! Builds the completion prompt that teaches the model the action convention
//! the parser understands.

use crate::agent::{Conversation, FINAL_ANSWER_MARKER};
use crate::core::ToolDescription;

/// Default preamble when no system prompt is configured
pub const DEFAULT_PREAMBLE: &str =
    "You are a helpful assistant. Use the following tools to help answer the question:";

/// Renders prompts for text-completion models
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl PromptBuilder {
    /// Create a builder with the default preamble
    pub fn new() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }

    /// Create a builder with a custom preamble
    pub fn with_preamble(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Render the full prompt for the next model turn
    pub fn build(&self, conversation: &Conversation, tools: &[ToolDescription]) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.preamble);
        prompt.push_str("\n\n");

        if tools.is_empty() {
            prompt.push_str("(no tools available)\n");
        } else {
            for tool in tools {
                prompt.push_str(&format!("{}: {}\n", tool.name, tool.description));
            }
        }

        prompt.push_str("\nTo use a tool, reply with a single line of the form ToolName(input), ");
        prompt.push_str("for example ");
        match tools.first() {
            Some(tool) => prompt.push_str(&format!("{}(...)", tool.name)),
            None => prompt.push_str("Tool(...)"),
        }
        prompt.push_str(", and nothing else.\n");
        prompt.push_str(&format!(
            "When you know the answer, reply with: {} <your answer>\n\n",
            FINAL_ANSWER_MARKER
        ));

        prompt.push_str(&conversation.render());
        prompt.push_str("\nThought:");
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
