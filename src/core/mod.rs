//! Core module - shared infrastructure for stepwise
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentConfig, Config, HttpToolConfig, ModelConfig, OllamaConfig};
pub use error::{ModelError, Result, RunError, StepwiseError, ToolError};
pub use types::*;
