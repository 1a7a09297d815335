//! Runtime configuration.
//!
//! Everything has a default, so an empty JSON object or an empty environment
//! yields a usable configuration (pointing at Gemini, without an API key).

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::core::executor::DEFAULT_TIMEOUT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("provider '{0}' requires an API key")]
    MissingApiKey(&'static str),

    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[cfg(feature = "llm")]
    #[error(transparent)]
    Client(#[from] crate::llm::LLMError),
}

/// Which model backend answers flow invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "googleai" => Ok(ProviderKind::Gemini),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "provider",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelfwiseConfig {
    pub provider: ProviderKind,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    /// Bound on one model round trip, in seconds. `0` disables the bound.
    pub timeout_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub ollama_host: Option<String>,
}

impl Default for ShelfwiseConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            gemini_api_key: None,
            gemini_base_url: None,
            ollama_host: None,
        }
    }
}

impl ShelfwiseConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads `SHELFWISE_*`, `GEMINI_API_KEY`/`GOOGLE_API_KEY` and `OLLAMA_HOST`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(provider) = get("SHELFWISE_PROVIDER") {
            config.provider = provider.parse()?;
        }
        config.model = get("SHELFWISE_MODEL");
        if let Some(secs) = get("SHELFWISE_TIMEOUT_SECS") {
            config.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SHELFWISE_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
        }
        config.gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));
        config.gemini_base_url = get("GEMINI_BASE_URL");
        config.ollama_host = get("OLLAMA_HOST");

        Ok(config)
    }

    /// Executor timeout; `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Builds the configured HTTP model client.
    #[cfg(feature = "llm")]
    pub fn model_service(
        &self,
    ) -> Result<std::sync::Arc<dyn crate::core::model::ModelService>, ConfigError> {
        use crate::llm::{Client, GeminiConfig, OllamaConfig};
        use std::sync::Arc;

        let mut client = Client::new();
        if let Some(timeout) = self.timeout() {
            client = client.with_request_timeout(timeout)?;
        }

        match self.provider {
            ProviderKind::Gemini => {
                let api_key = self
                    .gemini_api_key
                    .clone()
                    .ok_or(ConfigError::MissingApiKey("gemini"))?;
                let mut gemini = GeminiConfig {
                    api_key,
                    ..Default::default()
                };
                if let Some(url) = &self.gemini_base_url {
                    gemini.base_url = url.clone();
                }
                if let Some(model) = &self.model {
                    gemini.default_model = model.clone();
                }
                Ok(Arc::new(client.with_gemini_config(gemini)))
            }
            ProviderKind::Ollama => {
                let mut ollama = OllamaConfig::default();
                if let Some(host) = &self.ollama_host {
                    ollama.host = host.clone();
                }
                if let Some(model) = &self.model {
                    ollama.default_model = model.clone();
                }
                Ok(Arc::new(client.with_ollama_config(ollama)))
            }
        }
    }
}
