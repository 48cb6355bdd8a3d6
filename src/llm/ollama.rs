//! Ollama client implementation
//!
//! Async HTTP client for the Ollama completion API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::agent::Conversation;
use crate::core::{Config, ModelError, ToolDescription};
use crate::llm::prompt::PromptBuilder;
use crate::llm::traits::{GenerateOptions, ModelInvoker};

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
    prompt: PromptBuilder,
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ollama.timeout_secs))
            .build()?;

        let prompt = match config.agent.system_prompt {
            Some(ref preamble) => PromptBuilder::with_preamble(preamble.clone()),
            None => PromptBuilder::new(),
        };

        let stop = (!config.model.stop.is_empty()).then(|| config.model.stop.clone());

        Ok(Self {
            client,
            base_url: config.ollama_url(),
            model: config.model.name.clone(),
            options: GenerateOptions {
                temperature: Some(config.model.temperature),
                max_tokens: config.model.num_predict,
                stop,
            },
            prompt,
        })
    }

    /// Create a client for a specific server and model with default options
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, ModelError> {
        let mut config = Config::default();
        config.model.name = model.into();
        let mut client = Self::from_config(&config)?;
        client.base_url = base_url.into();
        Ok(client)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_connect() {
            ModelError::Unreachable(self.base_url.clone())
        } else {
            ModelError::from(e)
        }
    }

    /// Send a raw prompt and return the completion
    pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            options: Some(OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.max_tokens,
                stop: self.options.stop.clone(),
            }),
            stream: false,
        };

        debug!(model = %self.model, "Ollama request prompt:\n{}", prompt);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(ModelError::ModelNotFound(self.model.clone()));
            }

            return Err(ModelError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response.text().await?;
        let generated: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        debug!(
            prompt_tokens = generated.prompt_eval_count,
            completion_tokens = generated.eval_count,
            "Ollama response:\n{}",
            generated.response
        );

        Ok(generated.response)
    }

    /// List models available on the server
    pub async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(ModelError::Api {
                status: response.status().as_u16(),
                body: "Failed to list models".to_string(),
            });
        }

        let models_response: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if the configured model is available; `llama3.2` matches `llama3.2:latest`
    pub async fn is_model_available(&self) -> Result<bool, ModelError> {
        let models = self.list_models().await?;
        let wanted = self.model.split(':').next();
        Ok(models
            .iter()
            .any(|m| m == &self.model || m.split(':').next() == wanted))
    }
}

#[async_trait]
impl ModelInvoker for OllamaClient {
    async fn invoke(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescription],
    ) -> Result<String, ModelError> {
        let prompt = self.prompt.build(conversation, tools);
        self.generate(&prompt).await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
