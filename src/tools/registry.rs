//! Tool registry - named capabilities the agent loop may invoke
//!
//! Tools are registered once, by unique name, before a run starts and are
//! only read while the loop is running.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::{HttpToolConfig, Result, StepwiseError, ToolDescription, ToolError};
use crate::tools::http::HttpTool;

/// An external capability with a text-in, text-out contract
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool (e.g. "StockData")
    fn name(&self) -> &str;

    /// What the tool does and what input it expects (sent to the model)
    fn description(&self) -> &str;

    /// Run the tool on the argument exactly as the model wrote it
    async fn invoke(&self, argument: &str) -> std::result::Result<String, ToolError>;

    /// Name and description for prompting
    fn describe(&self) -> ToolDescription {
        ToolDescription::new(self.name(), self.description())
    }
}

/// Registry of available tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of HTTP tools from configuration
    pub fn from_config(tools: &[HttpToolConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for config in tools {
            registry.register(HttpTool::from_config(config)?)?;
        }
        Ok(registry)
    }

    /// Register a tool. Names must be non-empty and unique.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<()> {
        self.register_boxed(Box::new(tool))
    }

    fn register_boxed(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(StepwiseError::config("tool name must not be empty"));
        }
        if self.index.contains_key(&name) {
            return Err(StepwiseError::config(format!(
                "tool '{}' is already registered",
                name
            )));
        }

        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptions of all tools, for the prompt
    pub fn descriptions(&self) -> Vec<ToolDescription> {
        self.tools.iter().map(|t| t.describe()).collect()
    }

    /// All registered tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
