//! Groq completion provider.
//!
//! Talks to Groq's OpenAI-compatible chat completions endpoint.

use super::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

/// Groq API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Groq provider configuration.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
}

/// Groq chat completion provider.
pub struct GroqProvider {
    config: GroqConfig,
    client: Client,
}

impl GroqProvider {
    pub fn new(config: GroqConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        tracing::debug!(
            model = %request.model,
            temperature = request.temperature,
            message_count = request.messages.len(),
            "Sending request to Groq API"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Api(api_error_message(status, &body)));
        }

        Ok(Completion {
            content: first_choice_content(&body),
        })
    }
}

/// Prefer the provider's own `error.message`; fall back to status and body.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("{} {}", status, body).trim_end().to_string())
}

/// Any shape other than `choices[0].message.content: string` yields `None`.
fn first_choice_content(body: &str) -> Option<String> {
    serde_json::from_str::<ChatCompletionResponse>(body)
        .ok()?
        .choices
        .into_iter()
        .next()?
        .message?
        .content
}

// ============================================================================
// Groq API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
