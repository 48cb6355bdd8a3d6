//! Tool dispatcher
//!
//! Executes a tool call against the registry and always produces a tool
//! message. Failures never escape: they come back as `Error: ...` text the
//! model can react to.

use tracing::{debug, warn};

use crate::core::Message;
use crate::tools::ToolRegistry;

/// Content of the message produced for an unregistered tool
pub const TOOL_NOT_FOUND: &str = "Error: tool not found";

/// Routes tool calls to registered tools
pub struct ToolDispatcher<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Run the named tool and wrap its outcome in a tool message
    pub async fn dispatch(&self, name: &str, argument: &str) -> Message {
        let Some(tool) = self.registry.get(name) else {
            warn!(tool = name, "Tool not found");
            return Message::tool(name, TOOL_NOT_FOUND);
        };

        debug!(tool = name, argument, "Invoking tool");
        match tool.invoke(argument).await {
            Ok(output) => {
                debug!(tool = name, bytes = output.len(), "Tool succeeded");
                Message::tool(name, output)
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool failed");
                Message::tool(name, format!("Error: {}", e))
            }
        }
    }
}
