//! HTTP model-service clients.
//!
//! [`Client`] wraps a pooled `reqwest::Client` and uses a typestate to track
//! which providers are configured. Any configured client is a
//! [`ModelService`], so it plugs straight into a
//! [`FlowExecutor`](crate::core::executor::FlowExecutor).

pub mod error;
pub mod gemini;
pub mod ollama;

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::model::{ModelError, ModelService};

pub use error::LLMError;
pub use gemini::{GeminiConfig, GeminiContent, GeminiGenerationConfig, GeminiResponse};
pub use ollama::{OllamaConfig, OllamaMessage};

/// LLM client wrapper around reqwest::Client
/// Uses typestate pattern to track which providers are configured
#[derive(Clone)]
pub struct Client<S> {
    /// The underlying HTTP client; cloning shares its connection pool
    pub(crate) client: reqwest::Client,
    pub(crate) state: PhantomData<S>,
    pub(crate) gemini_config: Option<GeminiConfig>,
    pub(crate) ollama_config: Option<OllamaConfig>,
}

// ============================================================================
// Type States
// ============================================================================

/// Marker indicating a provider is enabled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enabled;

/// Marker indicating a provider is disabled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disabled;

/// Provider state container
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Providers<GeminiState, OllamaState> {
    _gemini: PhantomData<GeminiState>,
    _ollama: PhantomData<OllamaState>,
}

// ============================================================================
// Client constructors and builders
// ============================================================================

impl Client<Providers<Disabled, Disabled>> {
    /// Create a new client with no providers configured
    pub fn new() -> Self {
        Client {
            client: reqwest::Client::new(),
            state: PhantomData,
            gemini_config: None,
            ollama_config: None,
        }
    }
}

impl Default for Client<Providers<Disabled, Disabled>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Client<Providers<Disabled, O>> {
    /// Enable Gemini with an API key and the public endpoint
    pub fn with_gemini(self, api_key: impl Into<String>) -> Client<Providers<Enabled, O>> {
        self.with_gemini_config(GeminiConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Enable Gemini with a full configuration
    pub fn with_gemini_config(self, config: GeminiConfig) -> Client<Providers<Enabled, O>> {
        Client {
            client: self.client,
            state: PhantomData,
            gemini_config: Some(config),
            ollama_config: self.ollama_config,
        }
    }
}

impl<G> Client<Providers<G, Disabled>> {
    /// Enable Ollama on the default host (http://localhost:11434)
    pub fn with_ollama(self) -> Client<Providers<G, Enabled>> {
        self.with_ollama_config(OllamaConfig::default())
    }

    /// Enable Ollama with a full configuration
    pub fn with_ollama_config(self, config: OllamaConfig) -> Client<Providers<G, Enabled>> {
        Client {
            client: self.client,
            state: PhantomData,
            gemini_config: self.gemini_config,
            ollama_config: Some(config),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> Client<S> {
    /// Bound every HTTP request made by this client.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, LLMError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Name of the model the next dispatched call will use.
    pub fn active_model(&self) -> &str {
        if let Some(config) = &self.gemini_config {
            return &config.default_model;
        }
        if let Some(config) = &self.ollama_config {
            return &config.default_model;
        }
        "unconfigured"
    }

    /// Calls the first configured provider, Gemini before Ollama.
    /// Used where the provider typestate is erased.
    pub(crate) async fn dispatch_complete(
        &self,
        prompt: &str,
        output_shape: &str,
    ) -> Result<String, LLMError> {
        if self.gemini_config.is_some() {
            return gemini::GeminiCompletionBuilder::new(self)
                .system(shape_instruction(output_shape))
                .user(prompt)
                .json_mode(true)
                .execute()
                .await;
        }

        if self.ollama_config.is_some() {
            return ollama::OllamaCompletionBuilder::new(self)
                .system(shape_instruction(output_shape))
                .user(prompt)
                .schema(output_shape)
                .execute()
                .await;
        }

        Err(LLMError::ProviderNotConfigured(
            "No LLM provider available".to_string(),
        ))
    }
}

/// System instruction constraining the answer to `output_shape`.
pub(crate) fn shape_instruction(output_shape: &str) -> String {
    format!(
        "Respond with a single JSON object and nothing else. \
         The object must conform to this JSON schema:\n{output_shape}"
    )
}

#[async_trait]
impl<S: Clone + Send + Sync + 'static> ModelService for Client<S> {
    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError> {
        let text = self.dispatch_complete(prompt, output_shape).await?;
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        self.active_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Client::new();
        assert!(client.gemini_config.is_none());
        assert!(client.ollama_config.is_none());
        assert_eq!(client.active_model(), "unconfigured");
    }

    #[test]
    fn test_with_gemini() {
        let client = Client::new().with_gemini("test-key");
        let config = client.gemini_config.as_ref().unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(client.active_model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_with_ollama() {
        let client = Client::new().with_ollama_config(OllamaConfig {
            default_model: "llama3.2".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.ollama_config.as_ref().unwrap().host,
            "http://localhost:11434"
        );
        assert_eq!(client.active_model(), "llama3.2");
    }

    #[test]
    fn test_gemini_preferred_when_both_enabled() {
        let client = Client::new().with_ollama().with_gemini("key");
        assert_eq!(client.active_model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_invoke_without_provider_is_not_configured() {
        let client = Client::new();
        let err = client.invoke("prompt", "{}").await.unwrap_err();
        assert!(matches!(err, ModelError::NotConfigured(_)));
    }

    #[test]
    fn test_shape_instruction_embeds_shape() {
        let instruction = shape_instruction(r#"{"type":"object"}"#);
        assert!(instruction.ends_with(r#"{"type":"object"}"#));
    }
}
