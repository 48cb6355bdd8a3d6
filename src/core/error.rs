//! Custom error types for stepwise
//!
//! Tool and model failures have their own types because the loop treats them
//! differently: tool errors are folded back into the conversation, model
//! errors end the run.

use thiserror::Error;

use crate::agent::Conversation;

/// Failure of an external tool invocation
#[derive(Error, Debug)]
pub enum ToolError {
    /// The argument the model supplied is not usable by the tool
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network or connection failure
    #[error("request failed: {0}")]
    Transport(String),

    /// The upstream service did not answer in time
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The upstream service answered with a failure status
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream answer could not be understood
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl ToolError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an upstream status error
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }
}

/// Failure of the model backend
#[derive(Error, Debug)]
pub enum ModelError {
    /// Backend cannot be reached at all
    #[error("Cannot connect to Ollama at {0}. Is it running?")]
    Unreachable(String),

    /// Model not pulled on the backend
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Backend answered with an error status
    #[error("Ollama API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Backend answer could not be decoded
    #[error("Failed to parse model response: {0}")]
    InvalidResponse(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A run aborted because the model could not be invoked.
///
/// The conversation accumulated up to the failure is kept so the caller can
/// inspect it.
#[derive(Error, Debug)]
#[error("model invocation failed after {} message(s): {source}", .conversation.len())]
pub struct RunError {
    /// Conversation as it stood when the model call failed
    pub conversation: Conversation,
    /// The underlying model failure
    #[source]
    pub source: ModelError,
}

impl RunError {
    pub fn new(conversation: Conversation, source: ModelError) -> Self {
        Self {
            conversation,
            source,
        }
    }
}

/// Main error type for stepwise operations
#[derive(Error, Debug)]
pub enum StepwiseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model backend errors outside of a run
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A run ended on a model failure
    #[error(transparent)]
    Run(#[from] RunError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for stepwise operations
pub type Result<T> = std::result::Result<T, StepwiseError>;

impl StepwiseError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
