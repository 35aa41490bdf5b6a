//! Single-shot chat-completion relay client.
//!
//! Unlike image generation there is no job lifecycle here: one request in,
//! one completion out. The client only does request/response mapping plus
//! translation of upstream failures into the relay error taxonomy.

use serde::{Deserialize, Serialize};

use genrelay_core::error::RelayError;

/// Immutable configuration for the chat-completion provider.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base API URL, e.g. `https://openrouter.ai/api/v1`.
    pub api_url: String,
    /// Bearer token for the provider.
    pub api_key: String,
    /// Model requested when the caller does not name one.
    pub default_model: String,
    /// Timeout for one completion call.
    pub request_timeout: std::time::Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            default_model: "mistralai/mistral-7b-instruct".to_string(),
            request_timeout: std::time::Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat relay request: the conversation so far plus an optional model
/// override.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
}

/// The provider's answer: the first choice's content and the model that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub reply: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct CompletionsBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one chat-completion provider.
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: ChatConfig) -> Self {
        Self { client, config }
    }

    /// Relay one conversation to the provider and return the first choice.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, RelayError> {
        if request.messages.is_empty() {
            return Err(RelayError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        }

        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&CompletionsBody {
                model,
                messages: &request.messages,
            })
            .send()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(classify_upstream_failure(status.as_u16(), body));
        }

        let parsed: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            RelayError::Upstream("Provider returned no choices".to_string())
        })?;

        tracing::debug!(model = %parsed.model, "Chat completion relayed");

        Ok(ChatCompletion {
            reply: choice.message.content,
            model: if parsed.model.is_empty() {
                model.to_string()
            } else {
                parsed.model
            },
        })
    }
}

/// Map an upstream non-2xx completion response into the relay taxonomy.
fn classify_upstream_failure(status: u16, body: String) -> RelayError {
    match status {
        429 => RelayError::RateLimited(body),
        400..=499 => RelayError::InvalidRequest(body),
        _ => RelayError::Upstream(format!("{status}: {body}")),
    }
}
