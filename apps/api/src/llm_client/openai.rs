use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{chat_messages, ensure_success, user_content, ChatMessage, LlmProvider, ProviderError};
use crate::config::{ProviderConfig, ProviderKind};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const TEMPERATURE: f64 = 0.3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    url: String,
}

impl OpenAiProvider {
    /// A missing API key is not an error here; every call fails fast with
    /// [`ProviderError::MissingApiKey`] instead.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            url: format!(
                "{}{CHAT_COMPLETIONS_PATH}",
                config.endpoint_url.trim_end_matches('/')
            ),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let content = user_content(few_shot, user);
        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: chat_messages(system, &content),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyContent)?;

        debug!(model = %self.model, bytes = text.len(), "OpenAI call succeeded");
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::llm_client::test_support::{closed_port_url, spawn_server};

    fn provider(base_url: String, api_key: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(&ProviderConfig {
            provider: ProviderKind::OpenAi,
            api_key: api_key.map(String::from),
            model_name: "gpt-4o-mini".to_string(),
            endpoint_url: base_url,
        })
        .unwrap()
    }

    /// Echoes the received auth header and request body back as the
    /// assistant message so the test can inspect what was sent.
    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let content = json!({ "auth": auth, "request": body }).to_string();
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": format!("  {content}\n") } }]
        }))
    }

    #[tokio::test]
    async fn test_request_shape_and_first_choice() {
        let base = spawn_server(Router::new().route("/v1/chat/completions", post(echo))).await;
        let client = provider(format!("{base}/v1/"), Some("sk-test"));

        let raw = client.send("SYSTEM", "FEWSHOT", "USER").await.unwrap();
        assert_eq!(raw, raw.trim(), "content should be trimmed");

        let echoed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(echoed["auth"], "Bearer sk-test");
        let request = &echoed["request"];
        assert_eq!(request["model"], "gpt-4o-mini");
        assert_eq!(request["temperature"].as_f64(), Some(0.3));
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][0]["content"], "SYSTEM");
        assert_eq!(request["messages"][1]["role"], "user");
        assert_eq!(request["messages"][1]["content"], "FEWSHOT\n\nUSER");
        assert_eq!(request["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = provider(closed_port_url().await, None);
        let err = client.send("s", "f", "u").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_non_2xx_becomes_status_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let client = provider(spawn_server(router).await, Some("sk-bad"));

        let err = client.send("s", "f", "u").await.unwrap_err();
        match &err {
            ProviderError::Status { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(
            err.diagnostic(ProviderKind::OpenAi),
            "OPENAI HTTP 401: invalid api key"
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let client = provider(spawn_server(router).await, Some("sk-test"));

        let err = client.send("s", "f", "u").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyContent));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = provider(closed_port_url().await, Some("sk-test"));
        let err = client.send("s", "f", "u").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
        assert!(err
            .diagnostic(ProviderKind::OpenAi)
            .starts_with("OPENAI error: "));
    }
}
