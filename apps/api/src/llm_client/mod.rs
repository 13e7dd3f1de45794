/// LLM client: the single point of entry for every model call in the service.
///
/// ARCHITECTURAL RULE: No other module may talk to a model backend directly.
/// Handlers hold an `Arc<dyn LlmProvider>` built once at startup by
/// [`build_provider`]; there is no per-request backend switching.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::models::review::ReviewResult;

pub mod local;
pub mod mock;
pub mod openai;

pub use local::LocalProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

const STATUS_BODY_LIMIT: usize = 300;
const ERROR_MESSAGE_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl ProviderError {
    fn kind_name(&self) -> &'static str {
        match self {
            ProviderError::MissingApiKey => "MissingApiKey",
            ProviderError::Http(e) if e.is_timeout() => "Timeout",
            ProviderError::Http(e) if e.is_connect() => "ConnectError",
            ProviderError::Http(_) => "HttpError",
            ProviderError::Status { .. } => "StatusError",
            ProviderError::Decode(_) => "DecodeError",
            ProviderError::EmptyContent => "EmptyContent",
        }
    }

    /// One-line description appended to the fallback's notes.
    pub fn diagnostic(&self, provider: ProviderKind) -> String {
        match self {
            ProviderError::Status { status, body } => format!(
                "{provider} HTTP {status}: {}",
                truncate_chars(body, STATUS_BODY_LIMIT)
            ),
            other => format!(
                "{provider} error: {}: {}",
                other.kind_name(),
                truncate_chars(&other.to_string(), ERROR_MESSAGE_LIMIT)
            ),
        }
    }
}

/// A chat-capable model backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Sends the system prompt plus a single user message made of the
    /// few-shot block and the user prompt. Returns the raw model text.
    async fn send(&self, system: &str, few_shot: &str, user: &str)
        -> Result<String, ProviderError>;

    /// A precomputed answer that makes the model call unnecessary.
    fn canned(&self) -> Option<ReviewResult> {
        None
    }
}

/// Builds the process-wide provider from configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    Ok(match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::Local => Arc::new(LocalProvider::new(config)?),
        ProviderKind::Mock => Arc::new(MockProvider),
    })
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// The two-message conversation every backend receives.
fn chat_messages<'a>(system: &'a str, user_content: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user_content,
        },
    ]
}

fn user_content(few_shot: &str, user: &str) -> String {
    format!("{few_shot}\n\n{user}")
}

/// Turns a non-2xx response into [`ProviderError::Status`], keeping the body
/// for diagnostics.
async fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_diagnostic_truncates_body_to_300_chars() {
        let err = ProviderError::Status {
            status: 503,
            body: "x".repeat(1000),
        };
        let note = err.diagnostic(ProviderKind::OpenAi);
        assert_eq!(note, format!("OPENAI HTTP 503: {}", "x".repeat(300)));
    }

    #[test]
    fn test_missing_key_diagnostic() {
        let note = ProviderError::MissingApiKey.diagnostic(ProviderKind::OpenAi);
        assert_eq!(note, "OPENAI error: MissingApiKey: Missing OPENAI_API_KEY");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_user_content_puts_few_shot_first() {
        assert_eq!(user_content("EXAMPLES", "TASK"), "EXAMPLES\n\nTASK");
    }

    #[test]
    fn test_build_provider_selects_backend() {
        let mock = build_provider(&ProviderConfig::mock()).unwrap();
        assert_eq!(mock.kind(), ProviderKind::Mock);

        let local = build_provider(&ProviderConfig {
            provider: ProviderKind::Local,
            api_key: None,
            model_name: "llama3.2:3b".to_string(),
            endpoint_url: "http://localhost:11434".to_string(),
        })
        .unwrap();
        assert_eq!(local.kind(), ProviderKind::Local);
        assert_eq!(local.model(), "llama3.2:3b");
    }
}
