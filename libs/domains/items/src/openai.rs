//! Shared OpenAI client settings for embeddings and vision extraction.

use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// - `OPENAI_API_KEY` (optional; AI features are disabled without it)
/// - `OPENAI_BASE_URL` (default `https://api.openai.com/v1`)
/// - `OPENAI_EMBEDDING_MODEL` (default `text-embedding-3-small`)
/// - `OPENAI_VISION_MODEL` (default `gpt-4o`)
/// - `OPENAI_EMBEDDING_TIMEOUT_SECS` (30), `OPENAI_VISION_TIMEOUT_SECS` (60)
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
    pub vision_model: String,
    pub embedding_timeout: Duration,
    pub vision_timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            vision_model: "gpt-4o".to_string(),
            embedding_timeout: Duration::from_secs(30),
            vision_timeout: Duration::from_secs(60),
        }
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_optional("OPENAI_API_KEY"),
            embedding_model: env_or_default("OPENAI_EMBEDDING_MODEL", &defaults.embedding_model),
            vision_model: env_or_default("OPENAI_VISION_MODEL", &defaults.vision_model),
            embedding_timeout: Duration::from_secs(env_parse(
                "OPENAI_EMBEDDING_TIMEOUT_SECS",
                defaults.embedding_timeout.as_secs(),
            )?),
            vision_timeout: Duration::from_secs(env_parse(
                "OPENAI_VISION_TIMEOUT_SECS",
                defaults.vision_timeout.as_secs(),
            )?),
            base_url: defaults.base_url,
        }
        .with_base_url(env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL)))
    }
}

/// Human readable summary of a failed API call.
pub(crate) fn describe_api_error(status: StatusCode, body: &str) -> String {
    let lowered = body.to_lowercase();
    if lowered.contains("insufficient_quota") {
        "OpenAI API quota exceeded".to_string()
    } else if lowered.contains("invalid_api_key") {
        "Invalid OpenAI API key".to_string()
    } else {
        format!("OpenAI API error ({status}): {body}")
    }
}
