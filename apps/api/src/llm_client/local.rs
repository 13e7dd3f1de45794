use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{chat_messages, ensure_success, user_content, ChatMessage, LlmProvider, ProviderError};
use crate::config::{ProviderConfig, ProviderKind};

const CHAT_PATH: &str = "/api/chat";
const TEMPERATURE: f64 = 0.2;
/// Local inference is slow on CPU-only machines.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
/// Returned when the server answers without a message body.
const EMPTY_OBJECT: &str = "{}";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    options: SamplingOptions,
    /// Ollama's JSON mode: constrains decoding to a single JSON value.
    format: &'a str,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for a local model server speaking the Ollama chat API.
pub struct LocalProvider {
    client: Client,
    model: String,
    url: String,
}

impl LocalProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            model: config.model_name.clone(),
            url: format!("{}{CHAT_PATH}", config.endpoint_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LlmProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        system: &str,
        few_shot: &str,
        user: &str,
    ) -> Result<String, ProviderError> {
        let content = user_content(few_shot, user);
        let request = ChatRequest {
            model: &self.model,
            messages: chat_messages(system, &content),
            options: SamplingOptions {
                temperature: TEMPERATURE,
            },
            format: "json",
            stream: false,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let response = ensure_success(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let text = body
            .message
            .and_then(|m| m.content)
            .unwrap_or_else(|| EMPTY_OBJECT.to_string());

        debug!(model = %self.model, bytes = text.len(), "Local model call succeeded");
        Ok(text.trim().to_string())
    }
}
