//! Chat-completions client implementing [`AiCapability`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::summarize;
use crate::capability::AiCapability;
use crate::config::AiConfig;
use crate::error::{CapabilityError, CapabilityErrorKind, CapabilityResult};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// The parts of a chat-completions response the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Pull the first choice's content out of a response body.
pub fn extract_content(body: &str) -> CapabilityResult<String> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        CapabilityError::new(CapabilityErrorKind::Parse, format!("bad completion body: {e}"))
    })?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| CapabilityError::new(CapabilityErrorKind::Parse, "completion has no choices"))
}

/// One-line reason from an error body: `error.message` when present.
fn provider_message(body: &str) -> String {
    let reported = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string));
    summarize(reported.as_deref().unwrap_or(body))
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client, reading the key from `config.api_key_env`.
    pub fn from_config(config: &AiConfig) -> CapabilityResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CapabilityError::new(
                CapabilityErrorKind::InvalidConfig,
                format!("missing {}", config.api_key_env),
            )
        })?;
        Ok(Self::new(&config.api_base, &config.model, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiCapability for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> CapabilityResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CapabilityError::new(CapabilityErrorKind::Transport, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CapabilityError::new(CapabilityErrorKind::Transport, e.to_string()))?;
        debug!(status = %status, bytes = body.len(), "Completion received");

        if !status.is_success() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::Provider,
                format!("{status}: {}", provider_message(&body)),
            ));
        }
        extract_content(&body)
    }
}
