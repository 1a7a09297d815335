//! Ollama client for local inference

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{error::LLMError, Client};

/// Configuration for Ollama client
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama server URL (default: http://localhost:11434)
    pub host: String,
    /// Default model to use (default: phi4)
    pub default_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            default_model: "phi4".to_string(),
        }
    }
}

/// Request structure for Ollama chat completions
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    /// Either `"json"` or a JSON schema object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

/// A message in Ollama's chat format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

impl OllamaMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from Ollama's chat endpoint
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    pub model: String,
    pub message: OllamaMessage,
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
}

/// Builder for Ollama chat completions
pub(crate) struct OllamaCompletionBuilder<'a, S> {
    client: &'a Client<S>,
    messages: Vec<OllamaMessage>,
    format: Option<Value>,
}

impl<'a, S> OllamaCompletionBuilder<'a, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(client: &'a Client<S>) -> Self {
        Self {
            client,
            messages: Vec::new(),
            format: None,
        }
    }

    /// Add a system message
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(OllamaMessage::system(content));
        self
    }

    /// Add a user message
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(OllamaMessage::user(content));
        self
    }

    /// Constrain the answer to a JSON schema. Falls back to plain JSON mode
    /// when `shape` is not itself valid JSON.
    pub fn schema(mut self, shape: &str) -> Self {
        self.format = Some(
            serde_json::from_str::<Value>(shape)
                .unwrap_or_else(|_| Value::String("json".to_string())),
        );
        self
    }

    fn request(&self, model: String) -> OllamaChatRequest {
        OllamaChatRequest {
            model,
            messages: self.messages.clone(),
            stream: false,
            format: self.format.clone(),
        }
    }

    pub(crate) async fn execute(self) -> Result<String, LLMError> {
        let config = self.client.ollama_config.as_ref().ok_or_else(|| {
            LLMError::ProviderNotConfigured("Ollama not configured".to_string())
        })?;
        let request = self.request(config.default_model.clone());
        let response = self.client.call_ollama_chat(config, &request).await?;
        if !response.done {
            log::warn!("Ollama returned an unfinished response from {}", response.model);
        }
        Ok(response.message.content)
    }
}

impl<S> Client<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) async fn call_ollama_chat(
        &self,
        config: &OllamaConfig,
        request: &OllamaChatRequest,
    ) -> Result<OllamaChatResponse, LLMError> {
        let response = self
            .client
            .post(format!("{}/api/chat", config.host.trim_end_matches('/')))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::OllamaError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}
