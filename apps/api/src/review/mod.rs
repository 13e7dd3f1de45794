// Resume review: prompt construction, provider dispatch and output normalization.
// All model calls go through llm_client; no direct HTTP calls here.

pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod service;
