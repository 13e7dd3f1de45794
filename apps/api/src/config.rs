use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Model name reported by the mock backend.
pub const MOCK_MODEL: &str = "mock";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which LLM backend the process talks to. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Local,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Local => "LOCAL",
            ProviderKind::Mock => "MOCK",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "MOCK" => Ok(ProviderKind::Mock),
            "OPENAI" => Ok(ProviderKind::OpenAi),
            // OLLAMA is the historical name of the local backend.
            "LOCAL" | "OLLAMA" => Ok(ProviderKind::Local),
            other => bail!("Unknown PROVIDER '{other}' (expected OPENAI, LOCAL or MOCK)"),
        }
    }
}

/// Connection settings for the selected LLM backend.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model_name: String,
    pub endpoint_url: String,
}

impl ProviderConfig {
    pub fn mock() -> Self {
        Self {
            provider: ProviderKind::Mock,
            api_key: None,
            model_name: MOCK_MODEL.to_string(),
            endpoint_url: String::new(),
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider: ProviderKind = lookup("PROVIDER").unwrap_or_default().parse()?;

        Ok(match provider {
            ProviderKind::OpenAi => Self {
                provider,
                api_key: lookup("OPENAI_API_KEY"),
                model_name: lookup("OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                endpoint_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            },
            ProviderKind::Local => Self {
                provider,
                api_key: None,
                model_name: lookup("OLLAMA_MODEL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                endpoint_url: lookup("OLLAMA_URL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            },
            ProviderKind::Mock => Self::mock(),
        })
    }
}

// Hand-written so the API key never lands in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Application configuration loaded from environment variables.
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            provider: ProviderConfig::from_lookup(&lookup)?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(provider: ProviderConfig) -> Self {
        Self {
            provider,
            port: 0,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rust_log: "debug".to_string(),
        }
    }
}
