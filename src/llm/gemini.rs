//! Google Gemini client
//!
//! Talks to the `generateContent` endpoint of the Gemini API.

use serde::{Deserialize, Serialize};

use crate::llm::{error::LLMError, Client};

/// Configuration for Gemini client
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL (default: https://generativelanguage.googleapis.com)
    pub base_url: String,
    /// Default model to use (default: gemini-2.0-flash)
    pub default_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            default_model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Request structure for Gemini generate content
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

/// Content structure for Gemini
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

/// A part of content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.into()),
            }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Some("user"), text)
    }

    /// System instructions carry no role.
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(None, text)
    }
}

/// Generation configuration for Gemini
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// `application/json` switches the model into JSON output mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Response from Gemini generate content
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: GeminiContent,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Builder for Gemini content generation
pub(crate) struct GeminiCompletionBuilder<'a, S> {
    client: &'a Client<S>,
    system_prompt: Option<String>,
    contents: Vec<GeminiContent>,
    json_mode: bool,
}

impl<'a, S> GeminiCompletionBuilder<'a, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(client: &'a Client<S>) -> Self {
        Self {
            client,
            system_prompt: None,
            contents: Vec::new(),
            json_mode: false,
        }
    }

    /// Set the system instruction
    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = Some(text.into());
        self
    }

    /// Add a user turn
    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.contents.push(GeminiContent::user(text));
        self
    }

    /// Ask for `application/json` output
    pub fn json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    fn request(&self) -> GeminiRequest {
        GeminiRequest {
            contents: self.contents.clone(),
            system_instruction: self.system_prompt.as_deref().map(GeminiContent::system),
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: self.json_mode.then(|| "application/json".to_string()),
            }),
        }
    }

    /// Sends the request to the configured model.
    pub(crate) async fn execute(self) -> Result<String, LLMError> {
        let config = self.client.gemini_config.as_ref().ok_or_else(|| {
            LLMError::ProviderNotConfigured("Gemini not configured".to_string())
        })?;
        let response = self
            .client
            .call_gemini(config, &config.default_model, &self.request())
            .await?;

        if let Some(candidate) = response.candidates.first() {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                if reason != "STOP" {
                    log::warn!("Gemini finished with reason {}", reason);
                }
            }
        }

        response
            .text()
            .ok_or_else(|| LLMError::InvalidResponse("No candidates in response".to_string()))
    }
}

impl<S> Client<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) async fn call_gemini(
        &self,
        config: &GeminiConfig,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, LLMError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &config.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::GeminiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}
