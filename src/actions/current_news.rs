//! GET_CURRENT_NEWS action
//!
//! Resolves a search term (from the language model, a structured parameter,
//! or both, depending on `TermResolution`), runs one news search, and writes
//! the formatted top articles back to the conversation.

use crate::actions::{Action, ActionDescription, ActionExample};
use crate::config::{
    PluginConfig, TermResolution, ValidationPolicy, MAX_ARTICLES, MAX_EXCERPT_CHARS,
};
use crate::error::{ActionError, ActionResult};
use crate::news::format::{compose_response_text, format_articles, RESPONSE_ACTION};
use crate::news::{NewsApiClient, NewsSource};
use crate::runtime::{
    AgentRuntime, Content, Memory, ModelClass, ResponseCallback, TextGenerationRequest,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn, Instrument};

pub const ACTION_NAME: &str = "GET_CURRENT_NEWS";

const SIMILES: [&str; 7] = [
    "NEWS",
    "CURRENT_NEWS",
    "LATEST_NEWS",
    "FETCH_NEWS",
    "GET_NEWS",
    "CHECK_NEWS",
    "NEWS_UPDATE",
];

const DESCRIPTION: &str = "Get the current news for a given search term by the user";

/// Structured parameters the host may attach to a message
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsParams {
    /// Topic to search news for
    #[schemars(length(min = 1))]
    pub search_term: String,
}

/// Runtime behaviour of the action, derived from `[action]` and `[news]`
///
/// `max_articles` and `excerpt_chars` are capped at `MAX_ARTICLES` and
/// `MAX_EXCERPT_CHARS` when used, whatever values are set here.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSettings {
    pub term_resolution: TermResolution,
    pub validation: ValidationPolicy,
    pub max_articles: usize,
    pub excerpt_chars: usize,
    pub extraction_timeout: Duration,
    pub retrieval_timeout: Duration,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self::from_config(&PluginConfig::default())
    }
}

impl ActionSettings {
    pub fn from_config(config: &PluginConfig) -> Self {
        Self {
            term_resolution: config.action.term_resolution,
            validation: config.action.validation,
            max_articles: config.action.max_articles.min(MAX_ARTICLES),
            excerpt_chars: config.action.excerpt_chars.min(MAX_EXCERPT_CHARS),
            extraction_timeout: Duration::from_millis(config.action.extraction_timeout_ms),
            retrieval_timeout: retrieval_budget(config.news.timeout_ms, config.news.retry_attempts),
        }
    }
}

/// Time for every attempt plus the 100ms-per-attempt backoff between them
fn retrieval_budget(timeout_ms: u64, retry_attempts: u32) -> Duration {
    let retries = u64::from(retry_attempts);
    let backoff_ms = 50 * retries * (retries + 1);
    Duration::from_millis(
        timeout_ms
            .saturating_mul(retries + 1)
            .saturating_add(backoff_ms),
    )
}

pub struct GetCurrentNewsAction {
    news: Arc<dyn NewsSource>,
    settings: ActionSettings,
}

impl GetCurrentNewsAction {
    pub fn new(news: Arc<dyn NewsSource>, settings: ActionSettings) -> Self {
        Self { news, settings }
    }

    /// Resolve the news API key and build the action against the live API
    pub fn from_config(config: &PluginConfig) -> ActionResult<Self> {
        let client = NewsApiClient::new(config.news_api_config()?)?;
        Ok(Self::new(
            Arc::new(client),
            ActionSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    async fn resolve_search_term(
        &self,
        runtime: &AgentRuntime,
        message: &Memory,
    ) -> ActionResult<String> {
        match self.settings.term_resolution {
            TermResolution::Extraction => self.extract_search_term(runtime, message).await,
            TermResolution::Parameter => parameter_search_term(message)?.ok_or_else(|| {
                ActionError::extraction("message has no `searchTerm` parameter")
            }),
            TermResolution::ParameterOrExtraction => match parameter_search_term(message) {
                Ok(Some(term)) => Ok(term),
                Ok(None) => self.extract_search_term(runtime, message).await,
                Err(e) => {
                    debug!("Ignoring unusable searchTerm parameter: {}", e);
                    self.extract_search_term(runtime, message).await
                }
            },
        }
    }

    async fn extract_search_term(
        &self,
        runtime: &AgentRuntime,
        message: &Memory,
    ) -> ActionResult<String> {
        let text = message.content.text.trim();
        if text.is_empty() {
            return Err(ActionError::extraction("message has no text to extract from"));
        }

        let request = TextGenerationRequest {
            context: build_extraction_prompt(text),
            model_class: ModelClass::Small,
            stop: vec!["\n".to_string()],
        };

        let limit = self.settings.extraction_timeout;
        let raw = timeout(limit, runtime.text_generator().generate_text(request))
            .await
            .map_err(|_| ActionError::timeout("search term extraction", limit.as_millis() as u64))?
            .map_err(|e| ActionError::extraction(e.to_string()))?;

        clean_extracted_term(&raw)
            .ok_or_else(|| ActionError::extraction("model returned an empty search term"))
    }

    async fn run(
        &self,
        runtime: &AgentRuntime,
        message: &Memory,
        callback: &dyn ResponseCallback,
    ) -> ActionResult<bool> {
        let started = Instant::now();

        let search_term = self.resolve_search_term(runtime, message).await?;
        info!(search_term = %search_term, "Generated search term");

        let limit = self.settings.retrieval_timeout;
        let articles = timeout(limit, self.news.search(&search_term))
            .await
            .map_err(|_| ActionError::timeout("news retrieval", limit.as_millis() as u64))??;

        let max_articles = self.settings.max_articles.min(MAX_ARTICLES);
        let excerpt_chars = self.settings.excerpt_chars.min(MAX_EXCERPT_CHARS);
        let used = articles.len().min(max_articles);
        debug!(received = articles.len(), used, "Formatting news articles");

        let summary = format_articles(&articles, max_articles, excerpt_chars);
        let response = message.reply(Content {
            text: compose_response_text(&search_term, &summary),
            action: Some(RESPONSE_ACTION.to_string()),
            source: message.content.source.clone(),
            params: None,
        });

        runtime.message_manager().create_memory(response.clone()).await?;
        callback.send(&response.content).await?;

        info!(
            articles = used,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "News response delivered"
        );
        Ok(true)
    }
}

#[async_trait]
impl Action for GetCurrentNewsAction {
    fn describe(&self) -> ActionDescription {
        ActionDescription {
            name: ACTION_NAME.to_string(),
            similes: SIMILES.iter().map(|s| s.to_string()).collect(),
            description: DESCRIPTION.to_string(),
            examples: examples(),
            parameters: Some(params_schema()),
        }
    }

    async fn validate(&self, _runtime: &AgentRuntime, message: &Memory) -> bool {
        match self.settings.validation {
            ValidationPolicy::AcceptAll => true,
            ValidationPolicy::NonEmptyText => {
                !message.content.text.trim().is_empty()
                    || matches!(parameter_search_term(message), Ok(Some(_)))
            }
            ValidationPolicy::AliasMatch => mentions_alias(&message.content.text),
        }
    }

    async fn handler(
        &self,
        runtime: &AgentRuntime,
        message: &Memory,
        callback: &dyn ResponseCallback,
    ) -> ActionResult<bool> {
        let span = crate::action_span!(
            action = ACTION_NAME,
            message_id = %message.id,
            room_id = %message.room_id
        );

        let result = self.run(runtime, message, callback).instrument(span).await;
        if let Err(e) = &result {
            warn!(
                action = ACTION_NAME,
                error_kind = e.kind(),
                error = %e.sanitized_message(),
                "Action failed"
            );
        }
        result
    }
}

/// Prompt asking the model for the bare search phrase (pure function)
pub fn build_extraction_prompt(message_text: &str) -> String {
    format!(
        "Extract ONLY the topic to search news for from this message.\n\
         Ignore any casual conversation or greetings.\n\
         The message is: {message_text}\n\
         \n\
         Only output the exact search terms, no other text.\n\
         For example:\n\
         If message is \"Hey what's up, can you check news about Bitcoin?\" \
         -> output: \"Bitcoin\"\n\
         If message is \"Yo tell me about Tesla stock\" -> output: \"Tesla stock\""
    )
}

/// Trim model output and drop one pair of wrapping quotes (pure function)
pub fn clean_extracted_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'', '`']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// `Ok(None)` when no parameter is supplied, `Err` when it is unusable
fn parameter_search_term(message: &Memory) -> ActionResult<Option<String>> {
    let Some(params) = message.content.params.as_ref() else {
        return Ok(None);
    };
    if params.get("searchTerm").is_none() {
        return Ok(None);
    }

    validate_params(params)?;

    let parsed: NewsParams = serde_json::from_value(params.clone())
        .map_err(|e| ActionError::extraction(format!("invalid parameters: {e}")))?;
    let term = parsed.search_term.trim();
    if term.is_empty() {
        return Err(ActionError::extraction("`searchTerm` parameter is empty"));
    }
    Ok(Some(term.to_string()))
}

/// Check `params` against the generated JSON schema
fn validate_params(params: &Value) -> ActionResult<()> {
    let schema = params_schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| ActionError::extraction(format!("parameter schema error: {e}")))?;

    validator.validate(params).map_err(|errors| {
        let error_messages: Vec<String> = errors
            .map(|e| format!("At '{}': {}", e.instance_path, e))
            .collect();
        ActionError::extraction(format!("invalid parameters: {}", error_messages.join("; ")))
    })
}

fn params_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(NewsParams)).unwrap_or_default()
}

/// True if `text` mentions the action name or any simile (pure function)
fn mentions_alias(text: &str) -> bool {
    let text = text.to_lowercase();
    std::iter::once(ACTION_NAME)
        .chain(SIMILES)
        .map(|alias| alias.to_lowercase().replace('_', " "))
        .any(|alias| text.contains(&alias))
}

fn example(user: &str, text: &str, action: Option<&str>, search_term: &str) -> ActionExample {
    let mut content = Content::text(text).with_params(json!({ "searchTerm": search_term }));
    if let Some(action) = action {
        content = content.with_action(action);
    }
    ActionExample {
        user: user.to_string(),
        content,
    }
}

fn examples() -> Vec<Vec<ActionExample>> {
    let exchange = |question: &str, answer: &str, user_term: &str, agent_term: &str| {
        vec![
            example("{{user1}}", question, None, user_term),
            example("{{user2}}", answer, Some(ACTION_NAME), agent_term),
        ]
    };

    vec![
        exchange(
            "What's the latest news about Trump and Crypto?",
            "Let me check the latest SpaceX news for you",
            "Trump Crypto",
            "SpaceX",
        ),
        exchange(
            "Tell me what's happening with artificial intelligence",
            "I'll fetch the current AI news",
            "artificial intelligence",
            "artificial intelligence",
        ),
        exchange(
            "Any updates on climate change?",
            "Let me get the latest climate change news",
            "climate change",
            "climate change",
        ),
        exchange(
            "What's happening in the crypto market?",
            "I'll check the latest crypto news",
            "cryptocurrency news",
            "cryptocurrency news",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::Article;
    use crate::runtime::InMemoryMemoryManager;
    use crate::testing::{
        FailingMemoryManager, MockNewsSource, MockTextGenerator, RecordingCallback,
    };
    use uuid::Uuid;

    fn message(content: Content) -> Memory {
        Memory::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), content)
    }

    fn runtime(
        generator: Arc<MockTextGenerator>,
        memory: Arc<InMemoryMemoryManager>,
    ) -> AgentRuntime {
        AgentRuntime::new(Uuid::new_v4(), generator, memory)
    }

    fn settings(term_resolution: TermResolution) -> ActionSettings {
        ActionSettings {
            term_resolution,
            ..Default::default()
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article::new(format!("Title {i}"), format!("Desc {i}"), format!("Body {i}")))
            .collect()
    }

    #[test]
    fn test_describe_metadata() {
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(vec![])),
            ActionSettings::default(),
        );
        let description = action.describe();

        assert_eq!(description.name, "GET_CURRENT_NEWS");
        assert_eq!(description.similes.len(), 7);
        assert!(description.matches("FETCH_NEWS"));
        assert_eq!(description.examples.len(), 4);
        assert_eq!(
            description.examples[0][1].content.action.as_deref(),
            Some("GET_CURRENT_NEWS")
        );
        let schema = description.parameters.unwrap();
        assert!(schema["properties"]["searchTerm"].is_object());
    }

    #[test]
    fn test_clean_extracted_term() {
        assert_eq!(clean_extracted_term("Tesla stock"), Some("Tesla stock".to_string()));
        assert_eq!(clean_extracted_term("  \"Bitcoin\" "), Some("Bitcoin".to_string()));
        assert_eq!(clean_extracted_term("'AI'"), Some("AI".to_string()));
        assert_eq!(clean_extracted_term("\"\""), None);
        assert_eq!(clean_extracted_term("   "), None);
        // Unbalanced quotes are left alone
        assert_eq!(clean_extracted_term("\"Bitcoin"), Some("\"Bitcoin".to_string()));
    }

    #[test]
    fn test_extraction_prompt_embeds_message() {
        let prompt = build_extraction_prompt("Yo tell me about Tesla stock");
        assert!(prompt.contains("The message is: Yo tell me about Tesla stock"));
        assert!(prompt.contains("Only output the exact search terms"));
    }

    #[test]
    fn test_parameter_search_term() {
        let with_term = message(Content::text("").with_params(json!({"searchTerm": " SpaceX "})));
        assert_eq!(parameter_search_term(&with_term).unwrap(), Some("SpaceX".to_string()));

        let without = message(Content::text("hi"));
        assert_eq!(parameter_search_term(&without).unwrap(), None);

        let wrong_type = message(Content::text("").with_params(json!({"searchTerm": 7})));
        assert!(matches!(
            parameter_search_term(&wrong_type),
            Err(ActionError::ExtractionError { .. })
        ));

        let empty = message(Content::text("").with_params(json!({"searchTerm": ""})));
        assert!(parameter_search_term(&empty).is_err());
    }

    #[test]
    fn test_mentions_alias() {
        assert!(mentions_alias("Any NEWS about Mars?"));
        assert!(mentions_alias("give me a news update"));
        assert!(!mentions_alias("how are you today"));
    }

    #[tokio::test]
    async fn test_validation_policies() {
        let generator = Arc::new(MockTextGenerator::returning("x"));
        let runtime = runtime(generator, Arc::new(InMemoryMemoryManager::new()));
        let blank = message(Content::text("   "));
        let chatty = message(Content::text("how are you?"));
        let param_only = message(Content::text("").with_params(json!({"searchTerm": "SpaceX"})));

        let build = |validation| {
            GetCurrentNewsAction::new(
                Arc::new(MockNewsSource::new(vec![])),
                ActionSettings {
                    validation,
                    ..Default::default()
                },
            )
        };

        let accept_all = build(ValidationPolicy::AcceptAll);
        assert!(accept_all.validate(&runtime, &blank).await);

        let non_empty = build(ValidationPolicy::NonEmptyText);
        assert!(!non_empty.validate(&runtime, &blank).await);
        assert!(non_empty.validate(&runtime, &chatty).await);
        assert!(non_empty.validate(&runtime, &param_only).await);

        let alias = build(ValidationPolicy::AliasMatch);
        assert!(!alias.validate(&runtime, &chatty).await);
        assert!(alias.validate(&runtime, &message(Content::text("latest news on SpaceX"))).await);
    }

    #[tokio::test]
    async fn test_extraction_flow_end_to_end() {
        let generator = Arc::new(MockTextGenerator::returning("Tesla stock"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let news = Arc::new(MockNewsSource::new(articles(7)));
        let callback = RecordingCallback::new();
        let runtime = runtime(generator.clone(), memory.clone());
        let action = GetCurrentNewsAction::new(news.clone(), settings(TermResolution::Extraction));

        let incoming =
            message(Content::text("Yo tell me about Tesla stock").with_source("discord"));
        let handled = action.handler(&runtime, &incoming, &callback).await.unwrap();

        assert!(handled);
        assert_eq!(news.queries().await, vec!["Tesla stock".to_string()]);

        let requests = generator.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model_class, ModelClass::Small);
        assert_eq!(requests[0].stop, vec!["\n".to_string()]);

        let stored = memory.memories().await;
        assert_eq!(stored.len(), 1);
        let response = &stored[0];
        assert_eq!(response.user_id, incoming.user_id);
        assert_eq!(response.room_id, incoming.room_id);
        assert_eq!(response.content.action.as_deref(), Some("CURRENT_NEWS_RESPONSE"));
        assert_eq!(response.content.source.as_deref(), Some("discord"));
        assert!(response
            .content
            .text
            .starts_with("The current news for the search term Tesla stock is Title 0."));
        assert!(response.content.text.contains("Title 4."));
        assert!(!response.content.text.contains("Title 5."));

        assert_eq!(callback.contents().await, vec![response.content.clone()]);
    }

    #[tokio::test]
    async fn test_parameter_flow_skips_extraction() {
        let generator = Arc::new(MockTextGenerator::returning("should not be used"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let news = Arc::new(MockNewsSource::new(articles(1)));
        let runtime = runtime(generator.clone(), memory.clone());
        let action = GetCurrentNewsAction::new(news.clone(), settings(TermResolution::Parameter));

        let incoming = message(
            Content::text("Let me check the latest SpaceX news for you")
                .with_params(json!({"searchTerm": "SpaceX"})),
        );
        action
            .handler(&runtime, &incoming, &RecordingCallback::new())
            .await
            .unwrap();

        assert_eq!(news.queries().await, vec!["SpaceX".to_string()]);
        assert_eq!(generator.calls().await, 0);
    }

    #[tokio::test]
    async fn test_parameter_policy_requires_parameter() {
        let generator = Arc::new(MockTextGenerator::returning("Bitcoin"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let news = Arc::new(MockNewsSource::new(articles(1)));
        let runtime = runtime(generator.clone(), memory.clone());
        let action = GetCurrentNewsAction::new(news.clone(), settings(TermResolution::Parameter));

        let result = action
            .handler(
                &runtime,
                &message(Content::text("news on bitcoin?")),
                &RecordingCallback::new(),
            )
            .await;

        assert!(matches!(result, Err(ActionError::ExtractionError { .. })));
        assert_eq!(generator.calls().await, 0);
        assert!(news.queries().await.is_empty());
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_parameter_or_extraction_falls_back() {
        let generator = Arc::new(MockTextGenerator::returning("Bitcoin"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let news = Arc::new(MockNewsSource::new(articles(1)));
        let runtime = runtime(generator.clone(), memory.clone());
        let action = GetCurrentNewsAction::new(
            news.clone(),
            settings(TermResolution::ParameterOrExtraction),
        );

        let callback = RecordingCallback::new();
        action
            .handler(&runtime, &message(Content::text("Hey, news about Bitcoin?")), &callback)
            .await
            .unwrap();
        action
            .handler(
                &runtime,
                &message(Content::text("anything").with_params(json!({"searchTerm": "SpaceX"}))),
                &callback,
            )
            .await
            .unwrap();

        assert_eq!(
            news.queries().await,
            vec!["Bitcoin".to_string(), "SpaceX".to_string()]
        );
        assert_eq!(generator.calls().await, 1);
    }

    #[tokio::test]
    async fn test_empty_extraction_is_error() {
        let generator = Arc::new(MockTextGenerator::returning("  "));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let news = Arc::new(MockNewsSource::new(articles(3)));
        let callback = RecordingCallback::new();
        let runtime = runtime(generator, memory.clone());
        let action = GetCurrentNewsAction::new(news.clone(), settings(TermResolution::Extraction));

        let result = action
            .handler(&runtime, &message(Content::text("hello there")), &callback)
            .await;

        assert!(matches!(result, Err(ActionError::ExtractionError { .. })));
        assert!(news.queries().await.is_empty());
        assert!(memory.is_empty().await);
        assert!(callback.contents().await.is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_is_extraction_error() {
        let generator = Arc::new(MockTextGenerator::with_failure());
        let memory = Arc::new(InMemoryMemoryManager::new());
        let runtime = runtime(generator, memory.clone());
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(articles(3))),
            settings(TermResolution::Extraction),
        );

        let result = action
            .handler(
                &runtime,
                &message(Content::text("news on Mars")),
                &RecordingCallback::new(),
            )
            .await;

        assert!(matches!(result, Err(ActionError::ExtractionError { .. })));
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_retrieval_failure_writes_nothing() {
        let generator = Arc::new(MockTextGenerator::returning("Mars"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let callback = RecordingCallback::new();
        let runtime = runtime(generator, memory.clone());
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::with_failure()),
            settings(TermResolution::Extraction),
        );

        let result = action
            .handler(&runtime, &message(Content::text("news on Mars")), &callback)
            .await;

        assert!(matches!(result, Err(ActionError::RetrievalError { .. })));
        assert!(memory.is_empty().await);
        assert!(callback.contents().await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_extraction_times_out() {
        let generator = Arc::new(
            MockTextGenerator::returning("Mars").with_delay(Duration::from_millis(200)),
        );
        let memory = Arc::new(InMemoryMemoryManager::new());
        let runtime = runtime(generator, memory.clone());
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(articles(1))),
            ActionSettings {
                extraction_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        let result = action
            .handler(
                &runtime,
                &message(Content::text("news on Mars")),
                &RecordingCallback::new(),
            )
            .await;

        match result {
            Err(ActionError::TimeoutError { operation, timeout_ms }) => {
                assert_eq!(operation, "search term extraction");
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_slow_retrieval_times_out() {
        let generator = Arc::new(MockTextGenerator::returning("Mars"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let runtime = runtime(generator, memory.clone());
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(articles(1)).with_delay(Duration::from_millis(200))),
            ActionSettings {
                retrieval_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        let result = action
            .handler(
                &runtime,
                &message(Content::text("news on Mars")),
                &RecordingCallback::new(),
            )
            .await;

        assert!(matches!(result, Err(ActionError::TimeoutError { .. })));
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_failure_skips_callback() {
        let runtime = AgentRuntime::new(
            Uuid::new_v4(),
            Arc::new(MockTextGenerator::returning("Mars")),
            Arc::new(FailingMemoryManager),
        );
        let callback = RecordingCallback::new();
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(articles(2))),
            ActionSettings::default(),
        );

        let result = action
            .handler(&runtime, &message(Content::text("news on Mars")), &callback)
            .await;

        assert!(matches!(result, Err(ActionError::Runtime(_))));
        assert!(callback.contents().await.is_empty());
    }

    #[test]
    fn test_retrieval_budget_covers_retries() {
        assert_eq!(retrieval_budget(10_000, 0), Duration::from_millis(10_000));
        // 3 attempts plus 100ms and 200ms of backoff
        assert_eq!(retrieval_budget(1_000, 2), Duration::from_millis(3_300));

        let mut config = PluginConfig::default();
        config.news.timeout_ms = 500;
        config.news.retry_attempts = 1;
        assert_eq!(
            ActionSettings::from_config(&config).retrieval_timeout,
            Duration::from_millis(1_100)
        );
    }

    #[tokio::test]
    async fn test_oversized_settings_are_capped() {
        let generator = Arc::new(MockTextGenerator::returning("Mars"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let runtime = runtime(generator, memory.clone());
        let bulky: Vec<Article> = (0..10)
            .map(|i| Article::new(format!("T{i}"), format!("D{i}"), "x".repeat(3000)))
            .collect();
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(bulky)),
            ActionSettings {
                max_articles: 10,
                excerpt_chars: 3000,
                ..Default::default()
            },
        );

        action
            .handler(
                &runtime,
                &message(Content::text("news on Mars")),
                &RecordingCallback::new(),
            )
            .await
            .unwrap();

        let text = memory.memories().await[0].content.text.clone();
        assert_eq!(text.split("\n\n").count(), 5);
        assert!(text.contains("T4."));
        assert!(!text.contains("T5."));
        assert!(text.contains(&"x".repeat(1000)));
        assert!(!text.contains(&"x".repeat(1001)));
    }

    #[tokio::test]
    async fn test_excerpt_limit_applies() {
        let generator = Arc::new(MockTextGenerator::returning("Mars"));
        let memory = Arc::new(InMemoryMemoryManager::new());
        let runtime = runtime(generator, memory.clone());
        let long_body = "a".repeat(1000) + "TAIL";
        let action = GetCurrentNewsAction::new(
            Arc::new(MockNewsSource::new(vec![Article::new("T", "D", long_body)])),
            ActionSettings::default(),
        );

        action
            .handler(
                &runtime,
                &message(Content::text("news on Mars")),
                &RecordingCallback::new(),
            )
            .await
            .unwrap();

        let text = memory.memories().await[0].content.text.clone();
        assert!(text.ends_with(&"a".repeat(1000)));
        assert!(!text.contains("TAIL"));
    }
}
