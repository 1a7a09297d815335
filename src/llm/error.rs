use thiserror::Error;

use crate::core::model::ModelError;

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Gemini error: {0}")]
    GeminiError(String),

    #[error("Ollama error: {0}")]
    OllamaError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<LLMError> for ModelError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::HttpError(e) if e.is_timeout() => {
                ModelError::Transport(format!("request timed out: {e}"))
            }
            LLMError::HttpError(e) => ModelError::Transport(e.to_string()),
            LLMError::GeminiError(msg) | LLMError::OllamaError(msg) => ModelError::Provider(msg),
            LLMError::SerializationError(e) => {
                ModelError::Provider(format!("unreadable provider payload: {e}"))
            }
            LLMError::ProviderNotConfigured(msg) => ModelError::NotConfigured(msg),
            LLMError::InvalidResponse(msg) if msg.is_empty() => ModelError::EmptyResponse,
            LLMError::InvalidResponse(msg) => ModelError::Provider(msg),
        }
    }
}
