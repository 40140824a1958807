//! AI integration.
//!
//! A [`ChatTransport`] sends one chat-completion request; the
//! [`pipeline::AiPipeline`] chains requests into commit and release builds.

pub mod groq;
pub mod pipeline;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use groq::GroqClient;
pub use pipeline::{
    AiPipeline, AiStageError, BuildError, CommitBuildInput, PipelineStage, ReleaseText,
    COMMIT_SEPARATOR,
};

/// Model used when a prompt configuration leaves the model empty.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// A single message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("model is missing")]
    MissingModel,

    #[error("no messages to send")]
    EmptyMessages,

    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("API response did not contain a valid choice")]
    NoChoices,
}

/// Sends a conversation to a chat-completion endpoint and returns the
/// content of the first choice.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AiError>;

    /// Transport name for logs.
    fn name(&self) -> &str;
}
