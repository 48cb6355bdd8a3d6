//! Configuration management for stepwise
//!
//! Supports a config file, environment variables and runtime overrides.
//! Everything is resolved once in [`Config::load`]; the `Default` impls
//! never read the environment.
//!
//! Config file location: ~/.config/stepwise/config.toml

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, StepwiseError};

/// Main configuration for stepwise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// Model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// HTTP tools exposed to the model
    #[serde(default)]
    pub tools: Vec<HttpToolConfig>,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name as known to Ollama
    /// Default: llama3.2
    pub name: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Stop sequences; generation halts before the model invents an observation
    pub stop: Vec<String>,
    /// Maximum tokens per reply (Ollama `num_predict`); unset means no limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Agent loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model invocations per run
    /// Default: 6
    pub max_turns: usize,
    /// Maximum tool dispatches per run
    /// Default: 1
    pub max_tool_calls: usize,
    /// Whether to log prompts and raw model output
    pub debug: bool,
    /// System prompt prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// An HTTP endpoint exposed to the model as a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpToolConfig {
    /// Name the model uses to call the tool, e.g. `StockData`
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// URL with `{input}` and optionally `{api_key}` placeholders
    pub url_template: String,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Resolved API key; never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Responses longer than this are truncated
    #[serde(default = "default_max_response_chars")]
    pub max_response_chars: usize,
    /// Request timeout in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_response_chars() -> usize {
    4000
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "llama3.2".to_string(),
            temperature: 0.0,
            stop: vec!["\nObservation:".to_string()],
            num_predict: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 6,
            max_tool_calls: 1,
            debug: false,
            system_prompt: None,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value == "true" || value == "1"
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stepwise")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    ///
    /// Priority: env vars > config file > defaults. CLI overrides are applied
    /// by the caller afterwards. Only the default location may be missing; an
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) if !path.exists() => {
                return Err(StepwiseError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Self::load_from_path(path)?,
            None => {
                let path = Self::config_file();
                if path.exists() {
                    Self::load_from_path(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StepwiseError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| StepwiseError::config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(port) = lookup("OLLAMA_PORT").and_then(|p| p.parse().ok()) {
            self.ollama.port = port;
        }
        if let Some(model) = lookup("STEPWISE_MODEL") {
            self.model.name = model;
        }
        if let Some(turns) = lookup("STEPWISE_MAX_TURNS").and_then(|v| v.parse().ok()) {
            self.agent.max_turns = turns;
        }
        if let Some(calls) = lookup("STEPWISE_MAX_TOOL_CALLS").and_then(|v| v.parse().ok()) {
            self.agent.max_tool_calls = calls;
        }
        if let Some(debug) = lookup("STEPWISE_DEBUG") {
            self.agent.debug = parse_flag(&debug);
        }

        for tool in &mut self.tools {
            if let Some(ref var) = tool.api_key_env {
                if let Some(key) = lookup(var) {
                    tool.api_key = Some(key);
                }
            }
        }
    }

    /// Check invariants the loop relies on
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_turns == 0 {
            return Err(StepwiseError::config("agent.max_turns must be at least 1"));
        }
        if self.ollama.timeout_secs == 0 {
            return Err(StepwiseError::config("ollama.timeout_secs must be at least 1"));
        }

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if tool.name.trim().is_empty() {
                return Err(StepwiseError::config("tool name must not be empty"));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(StepwiseError::config(format!(
                    "duplicate tool name '{}'",
                    tool.name
                )));
            }
            if tool.timeout_secs == 0 {
                return Err(StepwiseError::config(format!(
                    "tool '{}' timeout_secs must be at least 1",
                    tool.name
                )));
            }
            if !tool.url_template.contains("{input}") {
                return Err(StepwiseError::config(format!(
                    "tool '{}' url_template has no {{input}} placeholder",
                    tool.name
                )));
            }
        }

        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    StepwiseError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| StepwiseError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| StepwiseError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Render the configuration as TOML for display
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        Config::default().to_toml()
    }
}
