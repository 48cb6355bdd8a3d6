//! Agent
//!
//! Wires configuration, the Ollama backend and the configured tools into an
//! [`AgentLoop`]. This is what the CLI talks to.

use std::sync::Arc;

use crate::agent::controller::AgentLoop;
use crate::agent::conversation::Conversation;
use crate::core::{Config, ModelError, Result};
use crate::llm::{ModelInvoker, OllamaClient};
use crate::tools::ToolRegistry;

/// An agent backed by a local Ollama model
pub struct Agent {
    /// Configuration
    config: Config,
    /// LLM client
    llm: Arc<OllamaClient>,
    /// The model/tool loop
    agent_loop: AgentLoop,
}

impl Agent {
    /// Create an agent from configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let llm = Arc::new(OllamaClient::from_config(&config)?);
        let tools = Arc::new(ToolRegistry::from_config(&config.tools)?);

        let model: Arc<dyn ModelInvoker> = llm.clone();
        let agent_loop = AgentLoop::new(model, tools, config.agent.clone());
        Ok(Self {
            config,
            llm,
            agent_loop,
        })
    }

    /// Check that Ollama is reachable and the model is pulled
    pub async fn initialize(&self) -> Result<()> {
        if !self.llm.is_model_available().await? {
            return Err(ModelError::ModelNotFound(self.config.model.name.clone()).into());
        }

        Ok(())
    }

    /// Answer one question, returning the whole conversation
    pub async fn ask(&self, question: &str) -> Result<Conversation> {
        Ok(self.agent_loop.run(question).await?)
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.llm.list_models().await?)
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        self.agent_loop.tools()
    }
}
