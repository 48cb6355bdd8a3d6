//! Conversation history
//!
//! Append-only record of one run: the user question, every model reply that
//! led to a tool call, every tool result, and the final assistant message.

use serde::{Deserialize, Serialize};

use crate::core::{Message, Role};

/// Ordered, append-only message log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Most recent message with the given role
    pub fn last(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    /// Most recent message of any role
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the terminating assistant message, if the run ended on one
    pub fn final_answer(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Render the conversation as prompt text
    ///
    /// User messages become the question, assistant messages are replayed
    /// verbatim, and tool results are presented as observations.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| match m.role {
                Role::User => format!("Question: {}", m.content),
                Role::Assistant => m.content.clone(),
                Role::Tool => format!("Observation: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
