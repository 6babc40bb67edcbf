//! Text generation on top of an `LlmProvider`
//!
//! Maps a host-style `generate_text` call (prompt, model class, stop
//! sequences) onto a single-message completion request.

use crate::config::LlmSection;
use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider};
use crate::runtime::{ModelClass, TextGenerationRequest, TextGenerator};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// `TextGenerator` backed by an LLM provider
pub struct LlmTextGenerator {
    provider: Arc<dyn LlmProvider>,
    small_model: String,
    large_model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmTextGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSection) -> Self {
        Self {
            provider,
            small_model: settings.small_model.clone(),
            large_model: settings.large_model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// Model name for a size tier (pure function)
    fn model_for(&self, class: ModelClass) -> &str {
        match class {
            ModelClass::Small => &self.small_model,
            ModelClass::Medium | ModelClass::Large => &self.large_model,
        }
    }

    /// Build the completion request (pure function)
    fn build_request(&self, request: TextGenerationRequest) -> CompletionRequest {
        CompletionRequest::prompt(self.model_for(request.model_class), request.context)
            .with_stop(request.stop)
            .with_sampling(self.temperature, self.max_tokens)
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String, LlmError> {
        let completion = self.build_request(request);
        debug!(
            provider = self.provider.name(),
            model = %completion.model,
            "Generating text"
        );

        let response = self.provider.complete(completion).await?;
        Ok(response.text().to_string())
    }
}
