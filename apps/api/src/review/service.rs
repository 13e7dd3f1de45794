//! Review orchestration: prompt, provider, normalizer.
//!
//! Provider failures never escape this module: they are logged and turned
//! into the fallback result with a diagnostic note, so callers always get a
//! renderable answer.

use tracing::{debug, info, warn};

use crate::llm_client::LlmProvider;
use crate::models::review::{RefineRequest, ReviewRequest, ReviewResult};
use crate::review::normalize::normalize;
use crate::review::prompts::{build_prompt, PromptMode};

/// The resume/JD pair every operation works on.
#[derive(Debug, Clone, Copy)]
pub struct ReviewInput<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub target_role: Option<&'a str>,
}

impl<'a> From<&'a ReviewRequest> for ReviewInput<'a> {
    fn from(request: &'a ReviewRequest) -> Self {
        Self {
            resume_text: &request.resume_text,
            job_description: &request.job_description,
            target_role: request.target_role.as_deref(),
        }
    }
}

impl<'a> From<&'a RefineRequest> for ReviewInput<'a> {
    fn from(request: &'a RefineRequest) -> Self {
        Self {
            resume_text: &request.resume_text,
            job_description: &request.job_description,
            target_role: request.target_role.as_deref(),
        }
    }
}

/// Initial review of a resume against a job description.
pub async fn review(provider: &dyn LlmProvider, input: ReviewInput<'_>) -> ReviewResult {
    run(provider, input, PromptMode::Review).await
}

/// Revises `request.prior` according to the user's feedback.
pub async fn refine(provider: &dyn LlmProvider, request: &RefineRequest) -> ReviewResult {
    // A JSON object map always serializes.
    let prior_json = serde_json::to_string(&request.prior).unwrap_or_else(|_| "{}".to_string());

    run(
        provider,
        ReviewInput::from(request),
        PromptMode::Refine {
            feedback: &request.user_feedback,
            prior_json: &prior_json,
        },
    )
    .await
}

async fn run(
    provider: &dyn LlmProvider,
    input: ReviewInput<'_>,
    mode: PromptMode<'_>,
) -> ReviewResult {
    if let Some(canned) = provider.canned() {
        debug!(provider = %provider.kind(), "Returning canned result");
        return canned;
    }

    let prompt = build_prompt(
        input.resume_text,
        input.job_description,
        input.target_role,
        mode,
    );

    info!(
        provider = %provider.kind(),
        model = provider.model(),
        prompt_bytes = prompt.user.len(),
        "Calling LLM"
    );

    match provider
        .send(prompt.system, prompt.few_shot, &prompt.user)
        .await
    {
        Ok(raw) => normalize(&raw),
        Err(e) => {
            let detail = e.diagnostic(provider.kind());
            warn!("{detail}");
            ReviewResult::fallback_with_note(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::config::ProviderKind;
    use crate::llm_client::{MockProvider, ProviderError};
    use crate::review::normalize::NON_JSON_NOTE;

    /// Replays a fixed outcome and records the prompts it was sent.
    struct ScriptedProvider {
        outcome: fn() -> Result<String, ProviderError>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(outcome: fn() -> Result<String, ProviderError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_user_prompt(&self) -> String {
            self.seen.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn send(
            &self,
            _system: &str,
            _few_shot: &str,
            user: &str,
        ) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(user.to_string());
            (self.outcome)()
        }
    }

    fn input() -> ReviewInput<'static> {
        ReviewInput {
            resume_text: "Built ledger service in Rust",
            job_description: "Payments backend engineer",
            target_role: Some("Senior Engineer"),
        }
    }

    fn refine_request() -> RefineRequest {
        serde_json::from_value(serde_json::json!({
            "prior": { "ats_score": 61, "notes": ["first pass"] },
            "user_feedback": "Emphasize Kafka experience",
            "resume_text": "Built ledger service in Rust",
            "job_description": "Payments backend engineer"
        }))
        .unwrap()
    }

    fn assert_schema(result: &ReviewResult) {
        let value = serde_json::to_value(result).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert!(object["ats_score"].is_i64());
        assert!(object["missing_keywords"].is_array());
        assert!(object["improved_bullets"].is_array());
        assert!(object["positioning_summary"].is_string());
        assert!(object["short_cover_letter"].is_string());
        assert!(object["notes"].is_array());
    }

    #[tokio::test]
    async fn test_successful_call_is_normalized() {
        let provider = ScriptedProvider::new(|| {
            Ok(r#"```json
{"ats_score": 77, "missing_keywords": ["Kafka"], "improved_bullets": ["b"],
 "positioning_summary": "p", "short_cover_letter": "c", "notes": []}
```"#
                .to_string())
        });

        let result = review(&provider, input()).await;
        assert_eq!(result.ats_score, 77);
        assert_eq!(result.missing_keywords, vec!["Kafka"]);
        assert_schema(&result);
    }

    #[tokio::test]
    async fn test_http_failure_becomes_fallback_with_diagnostic() {
        let provider = ScriptedProvider::new(|| {
            Err(ProviderError::Status {
                status: 429,
                body: "rate limited".to_string(),
            })
        });

        let result = review(&provider, input()).await;
        assert_schema(&result);
        assert_eq!(
            result.notes.last().unwrap(),
            "OPENAI HTTP 429: rate limited"
        );
        assert_eq!(result.ats_score, ReviewResult::fallback().ats_score);
    }

    #[tokio::test]
    async fn test_missing_key_becomes_fallback_with_diagnostic() {
        let provider = ScriptedProvider::new(|| Err(ProviderError::MissingApiKey));
        let result = review(&provider, input()).await;
        assert_eq!(
            result.notes.last().unwrap(),
            "OPENAI error: MissingApiKey: Missing OPENAI_API_KEY"
        );
    }

    #[tokio::test]
    async fn test_malformed_output_becomes_fallback() {
        let provider = ScriptedProvider::new(|| Ok("I cannot help with that.".to_string()));
        let result = review(&provider, input()).await;
        assert_schema(&result);
        assert_eq!(result.notes.last().unwrap(), NON_JSON_NOTE);
    }

    #[tokio::test]
    async fn test_mock_returns_identical_results_for_any_input() {
        let first = review(&MockProvider, input()).await;
        let second = review(
            &MockProvider,
            ReviewInput {
                resume_text: "Completely different resume",
                job_description: "Data scientist",
                target_role: None,
            },
        )
        .await;
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(first, ReviewResult::fallback());
        assert_schema(&first);
    }

    #[tokio::test]
    async fn test_refine_sends_prior_and_feedback() {
        let provider = ScriptedProvider::new(|| Ok("garbage".to_string()));
        let request = refine_request();

        let result = refine(&provider, &request).await;
        assert_schema(&result);

        let prompt = provider.last_user_prompt();
        let prior_json = serde_json::to_string(&request.prior).unwrap();
        assert!(prompt.contains(&prior_json));
        assert!(prompt.contains("Emphasize Kafka experience"));
    }

    #[tokio::test]
    async fn test_mock_refine_short_circuits() {
        let result = refine(&MockProvider, &refine_request()).await;
        assert_eq!(result, ReviewResult::fallback());
    }
}
