use async_trait::async_trait;

use super::{LlmProvider, ProviderError};
use crate::config::{ProviderKind, MOCK_MODEL};
use crate::models::review::ReviewResult;

/// Offline backend. Never touches the network and always answers with the
/// fallback result, whatever the prompt.
pub struct MockProvider;

#[async_trait]
impl LlmProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }

    async fn send(
        &self,
        _system: &str,
        _few_shot: &str,
        _user: &str,
    ) -> Result<String, ProviderError> {
        serde_json::to_string(&ReviewResult::fallback())
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn canned(&self) -> Option<ReviewResult> {
        Some(ReviewResult::fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_ignores_prompt() {
        let a = MockProvider.send("s", "f", "resume A").await.unwrap();
        let b = MockProvider.send("other", "x", "resume B").await.unwrap();
        assert_eq!(a, b);
        let parsed: ReviewResult = serde_json::from_str(&a).unwrap();
        assert_eq!(parsed, ReviewResult::fallback());
    }

    #[test]
    fn test_canned_is_fallback() {
        assert_eq!(MockProvider.canned(), Some(ReviewResult::fallback()));
    }
}
