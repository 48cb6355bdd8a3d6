//! stepwise - bounded model/tool orchestration for local language models
//!
//! Asks a model what to do next, runs the tool it names, feeds the result
//! back, and stops on a final answer or when a budget runs out.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model invoker abstraction with Ollama implementation
//! - **Tools**: Tool trait, registry, and a configurable HTTP tool
//! - **Agent**: Action parser, dispatcher, run state machine and loop controller
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stepwise::core::{AgentConfig, Config};
//! use stepwise::llm::OllamaClient;
//! use stepwise::tools::ToolRegistry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = Arc::new(OllamaClient::from_config(&Config::default()).unwrap());
//!     let tools = Arc::new(ToolRegistry::new());
//!
//!     let conversation = stepwise::run("What is 2 + 2?", model, tools, AgentConfig::default())
//!         .await
//!         .unwrap();
//!     println!("{}", conversation.final_answer().unwrap_or_default());
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{run, Agent, AgentLoop, Conversation, Decision};
pub use cli::{format_response, Repl};
pub use core::{Config, Message, Result, Role, StepwiseError};
