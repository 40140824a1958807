//! Groq (OpenAI-compatible) chat-completion transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, ChatMessage, ChatTransport};

/// Default chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Chat-completion client for Groq or any OpenAI-compatible endpoint.
pub struct GroqClient {
    client: Client,
    endpoint: String,
}

impl GroqClient {
    /// Create a client posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() { DEFAULT_ENDPOINT.to_string() } else { endpoint };
        Self { client: Client::new(), endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for GroqClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Validates inputs before anything goes on the wire.
fn prepare_request(
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
) -> Result<ChatRequest, AiError> {
    if api_key.trim().is_empty() {
        return Err(AiError::MissingApiKey);
    }
    if messages.is_empty() {
        return Err(AiError::EmptyMessages);
    }
    if model.trim().is_empty() {
        return Err(AiError::MissingModel);
    }

    Ok(ChatRequest { model: model.trim().to_string(), messages: messages.to_vec() })
}

/// First non-empty choice content of a decoded response.
fn first_choice(response: ChatResponse) -> Result<String, AiError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AiError::NoChoices)
}

#[async_trait]
impl ChatTransport for GroqClient {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AiError> {
        let request = prepare_request(api_key, model, messages)?;
        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key.trim()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| AiError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "chat completion rejected");
            return Err(AiError::Status { status, body });
        }

        let response: ChatResponse =
            response.json().await.map_err(|err| AiError::Decode(err.to_string()))?;

        first_choice(response)
    }

    fn name(&self) -> &str {
        "groq"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::DEFAULT_MODEL;

    #[test]
    fn test_empty_endpoint_falls_back_to_default() {
        assert_eq!(GroqClient::new("  ").endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(GroqClient::new("http://localhost:8080/v1").endpoint(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_prepare_request_validation() {
        let messages = vec![ChatMessage::user("hi")];

        assert_eq!(prepare_request("", "m", &messages).unwrap_err(), AiError::MissingApiKey);
        assert_eq!(prepare_request("key", "m", &[]).unwrap_err(), AiError::EmptyMessages);

        assert_eq!(prepare_request("key", " ", &messages).unwrap_err(), AiError::MissingModel);

        let request = prepare_request("key", DEFAULT_MODEL, &messages).unwrap();
        assert_eq!(request.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_request_body_shape() {
        let request = prepare_request("key", "mixtral", &[ChatMessage::system("s")]).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "mixtral");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "s");
    }

    #[test]
    fn test_first_choice_decoding() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"done"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_choice(response).unwrap(), "done");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_choice(empty).unwrap_err(), AiError::NoChoices);

        let missing: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_choice(missing).unwrap_err(), AiError::NoChoices);
    }
}
