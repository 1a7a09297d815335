//! The model service seam.
//!
//! The executor only ever talks to a [`ModelService`]: prompt text and the
//! output shape go in, raw response text comes out. Transport, auth and the
//! provider's wire format live behind the trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("model service not configured: {0}")]
    NotConfigured(String),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// An opaque text-completion service.
///
/// Implementations are shared between concurrent invocations and must not
/// hold per-call state.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Sends `prompt` and asks for a response shaped like `output_shape`.
    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError>;

    /// Name of the model answering, for traces.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<M: ModelService + ?Sized> ModelService for Arc<M> {
    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError> {
        (**self).invoke(prompt, output_shape).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<M: ModelService + ?Sized> ModelService for Box<M> {
    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError> {
        (**self).invoke(prompt, output_shape).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
