//! HTTP text tool
//!
//! Calls a configured GET endpoint with the model's argument substituted into
//! the URL, and hands the body back as text. Pointing it at a quote or search
//! API is a matter of configuration.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::core::{HttpToolConfig, Result, StepwiseError, ToolError};
use crate::tools::registry::Tool;

const TRUNCATION_MARKER: &str = "…[truncated]";

/// Keys some APIs use to report a failure inside a 200 response
const ERROR_KEYS: &[&str] = &["Error Message", "error"];

/// A tool backed by an HTTP GET endpoint
pub struct HttpTool {
    name: String,
    description: String,
    url_template: String,
    api_key: Option<String>,
    api_key_env: Option<String>,
    max_response_chars: usize,
    timeout: Duration,
    client: Client,
}

impl HttpTool {
    /// Create a tool from its configuration
    pub fn from_config(config: &HttpToolConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StepwiseError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            url_template: config.url_template.clone(),
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
            max_response_chars: config.max_response_chars,
            timeout,
            client,
        })
    }

    /// Substitute the encoded argument and the API key into the template
    fn build_url(&self, argument: &str) -> std::result::Result<String, ToolError> {
        let encoded: String = url::form_urlencoded::byte_serialize(argument.as_bytes()).collect();
        let mut url = self.url_template.replace("{input}", &encoded);

        if url.contains("{api_key}") {
            let key = self.api_key.as_deref().ok_or_else(|| {
                ToolError::Other(match self.api_key_env {
                    Some(ref var) => format!("no API key configured (set {})", var),
                    None => "no API key configured".to_string(),
                })
            })?;
            url = url.replace("{api_key}", key);
        }

        url::Url::parse(&url)
            .map_err(|e| ToolError::invalid_input(format!("cannot build request URL: {}", e)))?;
        Ok(url)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ToolError {
        if err.is_timeout() {
            ToolError::Timeout(self.timeout.as_secs())
        } else {
            ToolError::Transport(err.to_string())
        }
    }
}

/// Turn a successful response body into tool output
fn interpret_body(body: &str) -> std::result::Result<String, ToolError> {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(body.trim().to_string());
    };

    if let Some(obj) = json.as_object() {
        if obj.is_empty() {
            return Err(ToolError::malformed("empty JSON object"));
        }
        if obj.len() == 1 {
            for key in ERROR_KEYS {
                if let Some(value) = obj.get(*key) {
                    let detail = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    return Err(ToolError::malformed(detail));
                }
            }
        }
    }

    serde_json::to_string_pretty(&json).map_err(|e| ToolError::malformed(e.to_string()))
}

fn truncate(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text,
    }
}

#[async_trait]
impl Tool for HttpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, argument: &str) -> std::result::Result<String, ToolError> {
        let argument = argument.trim();
        if argument.is_empty() {
            return Err(ToolError::invalid_input("argument must not be empty"));
        }

        let url = self.build_url(argument)?;
        tracing::debug!(tool = %self.name, "GET {}", self.url_template);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(ToolError::upstream(
                status.as_u16(),
                truncate(body.trim().to_string(), 200),
            ));
        }

        let output = interpret_body(&body)?;
        Ok(truncate(output, self.max_response_chars))
    }
}
