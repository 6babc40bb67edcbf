//! Mock implementations for testing
//!
//! Provides mock LlmProvider, TextGenerator, NewsSource, ResponseCallback and
//! MemoryManager implementations so the action can be exercised without a
//! model, a news API key or a host runtime.

use crate::error::{ActionError, ActionResult};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
};
use crate::news::{Article, NewsSource};
use crate::runtime::{
    Content, Memory, MemoryManager, ResponseCallback, RuntimeError, TextGenerationRequest,
    TextGenerator,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock LLM provider for testing
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub should_fail: bool,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            current_response: Arc::new(Mutex::new(0)),
            should_fail: false,
        }
    }

    pub fn with_failure() -> Self {
        Self {
            responses: vec![],
            current_response: Arc::new(Mutex::new(0)),
            should_fail: true,
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let response_idx = *current % self.responses.len().max(1);
        *current += 1;

        let content = if self.responses.is_empty() {
            "Mock response".to_string()
        } else {
            self.responses[response_idx].clone()
        };

        Ok(CompletionResponse {
            content: Some(content),
            model: request.model,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
        })
    }
}

/// Mock text generator recording every request it receives
#[derive(Debug, Default)]
pub struct MockTextGenerator {
    pub response: String,
    pub should_fail: bool,
    pub delay: Option<Duration>,
    pub requests: Arc<Mutex<Vec<TextGenerationRequest>>>,
}

impl MockTextGenerator {
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn requests(&self) -> Vec<TextGenerationRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock generation failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

/// Mock news source returning a fixed article list
#[derive(Debug, Default)]
pub struct MockNewsSource {
    pub articles: Vec<Article>,
    pub should_fail: bool,
    pub delay: Option<Duration>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockNewsSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    async fn search(&self, term: &str) -> ActionResult<Vec<Article>> {
        self.queries.lock().await.push(term.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(ActionError::retrieval("Mock news API failure"));
        }
        Ok(self.articles.clone())
    }
}

/// Callback that records every content it is sent
#[derive(Debug, Default)]
pub struct RecordingCallback {
    pub contents: Arc<Mutex<Vec<Content>>>,
    pub should_fail: bool,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub async fn contents(&self) -> Vec<Content> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl ResponseCallback for RecordingCallback {
    async fn send(&self, content: &Content) -> Result<(), RuntimeError> {
        if self.should_fail {
            return Err(RuntimeError::CallbackFailed(
                "Mock callback failure".to_string(),
            ));
        }
        self.contents.lock().await.push(content.clone());
        Ok(())
    }
}

/// Memory manager that rejects every write
#[derive(Debug, Default)]
pub struct FailingMemoryManager;

#[async_trait]
impl MemoryManager for FailingMemoryManager {
    async fn create_memory(&self, _memory: Memory) -> Result<(), RuntimeError> {
        Err(RuntimeError::MemoryFailed("Mock memory failure".to_string()))
    }
}
