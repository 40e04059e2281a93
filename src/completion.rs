//! Chat-completion provider abstraction and implementations.
//!
//! Defines the [`CompletionProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]** — returns errors; used when completion is not
//!   configured. Document listing and upload still work without an API key.
//! - **[`OpenAIProvider`]** — calls the OpenAI chat completions API.
//!
//! Failures surface as [`CompletionError`] variants so callers can present
//! stable, distinct messages for quota, credential, and availability
//! problems. Requests are never retried automatically — the caller sees the
//! first failure.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::CompletionConfig;
use crate::models::ChatMessage;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors from the completion service, mapped to distinct user-facing
/// messages. The `Display` strings are part of the API contract with the
/// frontend and are pinned by tests.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("OpenAI API quota exceeded. Please check your plan and billing details.")]
    QuotaExceeded,

    #[error("Invalid OpenAI API key. Please check the OPENAI_API_KEY environment variable.")]
    InvalidApiKey,

    #[error("OpenAI service is temporarily unavailable. Please try again later.")]
    Unavailable,

    #[error("OpenAI API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Completion request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion response was malformed: {0}")]
    InvalidResponse(String),

    #[error("Completion provider is disabled. Set [completion] provider in config.")]
    Disabled,
}

/// A chat-completion backend.
///
/// Implementations are constructed once at startup and passed down
/// explicitly, so tests can substitute a fake provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-3.5-turbo"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for the given message sequence.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;
}

// ============ Disabled Provider ============

/// A no-op provider that fails every call.
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Disabled)
    }
}

// ============ OpenAI Provider ============

/// Completion provider backed by the OpenAI chat completions API.
///
/// Posts to `{base_url}/chat/completions` with the configured model and a
/// bearer token from the `OPENAI_API_KEY` environment variable. The key is
/// checked at construction time so a misconfigured deployment fails at
/// startup rather than on the first request.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CompletionError::InvalidApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), message));
        }

        let json: serde_json::Value = response.json().await?;
        extract_completion_text(&json)
    }
}

/// Map an HTTP error status to the matching [`CompletionError`] variant.
fn classify_status(status: u16, message: String) -> CompletionError {
    match status {
        429 => CompletionError::QuotaExceeded,
        401 | 403 => CompletionError::InvalidApiKey,
        500..=599 => CompletionError::Unavailable,
        _ => CompletionError::Api { status, message },
    }
}

/// Pull `choices[0].message.content` out of a chat completions response.
fn extract_completion_text(json: &serde_json::Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| CompletionError::InvalidResponse("missing choices[0].message.content".to_string()))
}

/// Create the appropriate [`CompletionProvider`] based on configuration.
pub fn create_provider(
    config: &CompletionConfig,
) -> Result<Box<dyn CompletionProvider>, CompletionError> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
        other => Err(CompletionError::InvalidResponse(format!(
            "unknown completion provider: {}",
            other
        ))),
    }
}
