use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmProvider;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The one LLM backend for this process, chosen from `config.provider`.
    pub provider: Arc<dyn LlmProvider>,
}
