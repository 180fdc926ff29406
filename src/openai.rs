//! OpenAI chat-completion client
//!
//! Used for both the plain message relay and intent classification.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::OpenAiConfig;
use crate::error::NexusError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Anything that can turn a chat transcript into a single completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> crate::Result<String>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Either plain text or a multi-part (text + images) body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// First choice's content, trimmed. Missing pieces yield an empty reply.
fn extract_reply(response: &CompletionResponse) -> String {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.as_ref())
        .and_then(|message| message.content.as_deref())
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

/// Reusable OpenAI client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> crate::Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            NexusError::ConfigError("OPENAI_API_KEY is not set in environment".to_string())
        })?;

        let url = format!("{}/chat/completions", self.base_url);

        info!(model = %request.model, messages = request.messages.len(), "Calling OpenAI API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI API request failed: {}", e);
                NexusError::LlmError(format!("OpenAI API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error response ({}): {}", status, error_text);
            return Err(NexusError::LlmError(format!(
                "OpenAI API returned {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse OpenAI response: {}", e);
            NexusError::LlmError(format!("OpenAI parse error: {}", e))
        })?;

        Ok(extract_reply(&completion))
    }
}
