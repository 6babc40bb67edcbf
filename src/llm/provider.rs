//! Provider-neutral completion interface
//!
//! The news action only ever sends one user prompt and reads back a short
//! answer, so requests are built from a single prompt plus sampling knobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Completion request sent to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Generation halts before emitting any of these
    pub stop_sequences: Option<Vec<String>>,
}

impl CompletionRequest {
    /// One user turn addressed to `model`
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            model: model.into(),
            max_tokens: None,
            temperature: None,
            stop_sequences: None,
        }
    }

    /// Empty `stop` leaves the provider default in place
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop_sequences = if stop.is_empty() { None } else { Some(stop) };
        self
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Content with surrounding whitespace removed, empty when absent
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default().trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    /// Provider-specific or missing reason
    Other(String),
}

/// LLM provider trait for dependency injection and testing
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in logs, e.g. "openai"
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

impl LlmError {
    /// Transport failures and 5xx responses may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::NetworkError(_) | LlmError::ServerError(_))
    }
}
