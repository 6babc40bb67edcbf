//! News search API client
//!
//! Issues `GET {base_url}/v2/everything?q=<term>&apiKey=<key>` and validates
//! the response shape explicitly. The body is treated as untyped JSON: a
//! missing or malformed `articles` list is a retrieval error, never a panic
//! or a silently empty result. Only the first `MAX_ARTICLES` entries are
//! read; anything after them is never inspected.

use super::{Article, NewsSource};
use crate::config::{ConfigError, MAX_ARTICLES};
use crate::error::{ActionError, ActionResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn, Instrument};
use url::Url;

const EVERYTHING_PATH: &str = "/v2/everything";

/// News API client configuration
#[derive(Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    /// Extra attempts after a network failure or 5xx, 0 disables retries
    pub retry_attempts: u32,
    pub language: Option<String>,
    pub sort_by: Option<String>,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
            retry_attempts: 0,
            language: None,
            sort_by: None,
        }
    }
}

impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .field("retry_attempts", &self.retry_attempts)
            .field("language", &self.language)
            .field("sort_by", &self.sort_by)
            .finish()
    }
}

/// HTTP client for the news search endpoint
pub struct NewsApiClient {
    config: NewsApiConfig,
    endpoint: Url,
    client: reqwest::Client,
}

impl NewsApiClient {
    /// Build a client; the API key is checked on every search, not here
    pub fn new(config: NewsApiConfig) -> ActionResult<Self> {
        let endpoint = Self::build_endpoint(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ActionError::retrieval(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve the search endpoint from the base URL (pure function)
    fn build_endpoint(base_url: &str) -> Result<Url, ConfigError> {
        Url::parse(base_url)
            .and_then(|base| base.join(EVERYTHING_PATH))
            .map_err(|e| {
                ConfigError::InvalidConfig(format!("invalid news base URL '{base_url}': {e}"))
            })
    }

    /// Query string pairs for a search (pure function)
    fn build_query<'a>(config: &'a NewsApiConfig, term: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("q", term), ("apiKey", config.api_key.as_str())];
        if let Some(language) = &config.language {
            query.push(("language", language.as_str()));
        }
        if let Some(sort_by) = &config.sort_by {
            query.push(("sortBy", sort_by.as_str()));
        }
        query
    }

    /// Check if error should trigger retry (pure)
    fn should_retry(error: &RequestFailure) -> bool {
        matches!(error, RequestFailure::Network(_) | RequestFailure::Server(_))
    }

    /// Make single API request (impure I/O)
    async fn make_api_request(&self, term: &str) -> Result<Value, RequestFailure> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&Self::build_query(&self.config, term))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RequestFailure::Timeout
                } else {
                    RequestFailure::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RequestFailure::Server(format!("{status} - {error_text}")));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RequestFailure::Timeout
            } else {
                RequestFailure::Fatal(format!(
                    "response ({status}) is not valid JSON: {}",
                    e.without_url()
                ))
            }
        })?;

        if !status.is_success() {
            return Err(RequestFailure::Fatal(format!(
                "news API returned {status}: {}",
                api_error_message(&body)
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, term: &str) -> ActionResult<Vec<Article>> {
        let span = crate::news_span!(endpoint = %self.endpoint, term = %term);
        self.search_with_retry(term).instrument(span).await
    }
}

impl NewsApiClient {
    /// Retry orchestrator around `make_api_request` (impure)
    async fn search_with_retry(&self, term: &str) -> ActionResult<Vec<Article>> {
        if self.config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey("news API key".to_string()).into());
        }

        let mut attempt = 0u32;
        let body = loop {
            if attempt > 0 {
                let delay_ms = 100 * u64::from(attempt);
                debug!("News API retry attempt {} after {}ms delay", attempt, delay_ms);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self.make_api_request(term).await {
                Ok(body) => break body,
                Err(e) if attempt < self.config.retry_attempts && Self::should_retry(&e) => {
                    warn!("News API attempt {} failed: {}", attempt + 1, e.describe());
                    attempt += 1;
                }
                Err(RequestFailure::Timeout) => {
                    return Err(ActionError::timeout(
                        "news retrieval",
                        self.config.timeout.as_millis() as u64,
                    ));
                }
                Err(e) => return Err(ActionError::retrieval(e.describe())),
            }
        };

        let articles = parse_articles(&body)?;
        debug!("News API returned {} articles", articles.len());
        Ok(articles)
    }
}

/// Single-request failure, classified for the retry loop
#[derive(Debug)]
enum RequestFailure {
    Network(String),
    Server(String),
    Timeout,
    Fatal(String),
}

impl RequestFailure {
    fn describe(&self) -> String {
        match self {
            RequestFailure::Network(msg) => format!("request failed: {msg}"),
            RequestFailure::Server(msg) => format!("news API server error: {msg}"),
            RequestFailure::Timeout => "request timed out".to_string(),
            RequestFailure::Fatal(msg) => msg.clone(),
        }
    }
}

/// Best-effort error text from a non-success body (pure function)
fn api_error_message(body: &Value) -> String {
    match (
        body.get("code").and_then(Value::as_str),
        body.get("message").and_then(Value::as_str),
    ) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => code.to_string(),
        (None, None) => "no error details".to_string(),
    }
}

/// Validate and extract the leading articles of the list (pure function)
pub fn parse_articles(body: &Value) -> ActionResult<Vec<Article>> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(ActionError::retrieval(format!(
            "news API reported an error: {}",
            api_error_message(body)
        )));
    }

    let entries = match body.get("articles") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ActionError::retrieval(
                "`articles` field is not a list",
            ))
        }
        None => {
            return Err(ActionError::retrieval(
                "response has no `articles` field",
            ))
        }
    };

    entries
        .iter()
        .take(MAX_ARTICLES)
        .enumerate()
        .map(|(index, entry)| parse_article(index, entry))
        .collect()
}

fn parse_article(index: usize, entry: &Value) -> ActionResult<Article> {
    if !entry.is_object() {
        return Err(ActionError::retrieval(format!(
            "article {index} is not an object"
        )));
    }

    Ok(Article {
        title: string_field(index, entry, "title")?,
        description: string_field(index, entry, "description")?,
        content: string_field(index, entry, "content")?,
    })
}

/// Missing and null read as empty; any other non-string is malformed
fn string_field(index: usize, entry: &Value, field: &str) -> ActionResult<String> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(ActionError::retrieval(format!(
            "article {index} field `{field}` is not a string: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_endpoint() {
        let endpoint = NewsApiClient::build_endpoint("https://newsapi.org").unwrap();
        assert_eq!(endpoint.as_str(), "https://newsapi.org/v2/everything");

        let endpoint = NewsApiClient::build_endpoint("http://127.0.0.1:4010/").unwrap();
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:4010/v2/everything");

        assert!(NewsApiClient::build_endpoint("not a url").is_err());
    }

    #[test]
    fn test_build_query_includes_optional_filters() {
        let config = NewsApiConfig {
            api_key: "k".to_string(),
            language: Some("en".to_string()),
            sort_by: Some("publishedAt".to_string()),
            ..Default::default()
        };

        let query = NewsApiClient::build_query(&config, "Tesla stock");
        assert_eq!(
            query,
            vec![
                ("q", "Tesla stock"),
                ("apiKey", "k"),
                ("language", "en"),
                ("sortBy", "publishedAt"),
            ]
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = NewsApiConfig {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_parse_articles_in_order() {
        let body = json!({
            "status": "ok",
            "articles": [
                {"title": "First", "description": "one", "content": "body one"},
                {"title": "Second", "description": "two", "content": "body two"}
            ]
        });

        let articles = parse_articles(&body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "First");
        assert_eq!(articles[1].content, "body two");
    }

    #[test]
    fn test_parse_articles_missing_field() {
        let result = parse_articles(&json!({"status": "ok", "totalResults": 0}));
        assert!(matches!(result, Err(ActionError::RetrievalError { .. })));
    }

    #[test]
    fn test_parse_articles_not_a_list() {
        let result = parse_articles(&json!({"articles": {"title": "oops"}}));
        assert!(matches!(result, Err(ActionError::RetrievalError { .. })));
    }

    #[test]
    fn test_parse_articles_error_status() {
        let result = parse_articles(&json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        }));

        match result {
            Err(ActionError::RetrievalError { message }) => {
                assert!(message.contains("apiKeyInvalid"));
            }
            other => panic!("expected retrieval error, got {other:?}"),
        }
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let articles = parse_articles(&json!({
            "articles": [{"title": "Only a title", "description": null}]
        }))
        .unwrap();

        assert_eq!(articles[0], Article::new("Only a title", "", ""));
    }

    #[test]
    fn test_non_string_field_rejected() {
        let result = parse_articles(&json!({"articles": [{"title": 42}]}));
        assert!(matches!(result, Err(ActionError::RetrievalError { .. })));

        let result = parse_articles(&json!({"articles": ["just a string"]}));
        assert!(matches!(result, Err(ActionError::RetrievalError { .. })));
    }

    #[test]
    fn test_entries_past_the_limit_are_not_parsed() {
        let mut entries: Vec<Value> = (0..MAX_ARTICLES)
            .map(|i| json!({"title": format!("T{i}"), "description": "d", "content": "c"}))
            .collect();
        entries.push(json!({"title": 42}));
        entries.push(json!(["not", "an", "object"]));

        let articles = parse_articles(&json!({"status": "ok", "articles": entries})).unwrap();
        assert_eq!(articles.len(), MAX_ARTICLES);
        assert_eq!(articles[MAX_ARTICLES - 1].title, format!("T{}", MAX_ARTICLES - 1));
    }

    #[tokio::test]
    async fn test_blank_key_fails_before_request() {
        let client = NewsApiClient::new(NewsApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "  ".to_string(),
            ..Default::default()
        })
        .unwrap();

        let result = client.search("anything").await;
        assert!(matches!(result, Err(ActionError::ConfigurationError(_))));
    }
}
