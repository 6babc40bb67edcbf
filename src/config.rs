//! Plugin configuration
//!
//! Loaded once at startup from TOML, validated, then handed read-only to the
//! action and its collaborators. Secrets are never stored in the file: each
//! section names the environment variable that holds its API key.

use crate::news::NewsApiConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Hard ceiling on articles per response
pub const MAX_ARTICLES: usize = 5;

/// Hard ceiling on characters kept from each article body
pub const MAX_EXCERPT_CHARS: usize = 1000;

/// Top-level plugin configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PluginConfig {
    #[serde(default)]
    pub news: NewsSection,
    #[serde(default)]
    pub action: ActionSection,
    #[serde(default)]
    pub llm: LlmSection,
}

/// News search API section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsSection {
    /// Scheme and host of the news search API
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Environment variable containing the API key
    #[serde(default = "default_news_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds (default: 10000)
    #[serde(default = "default_news_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra attempts after a network failure or 5xx (default: 0, no retries)
    #[serde(default)]
    pub retry_attempts: u32,
    /// Optional ISO-639-1 language filter
    pub language: Option<String>,
    /// Optional sort order: relevancy, popularity or publishedAt
    pub sort_by: Option<String>,
}

impl Default for NewsSection {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key_env: default_news_api_key_env(),
            timeout_ms: default_news_timeout_ms(),
            retry_attempts: 0,
            language: None,
            sort_by: None,
        }
    }
}

fn default_news_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_news_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_news_timeout_ms() -> u64 {
    10_000
}

/// How the handler obtains its search term
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TermResolution {
    /// Ask the language model to pull the topic out of the message text
    #[default]
    Extraction,
    /// Read `params.searchTerm` and never call the model
    Parameter,
    /// Use `params.searchTerm` when present, otherwise extract
    ParameterOrExtraction,
}

/// Which messages the action accepts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Every message is accepted
    AcceptAll,
    /// Message must carry text or a search term parameter
    #[default]
    NonEmptyText,
    /// Message text must mention news or one of the action's aliases
    AliasMatch,
}

/// Action behaviour section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSection {
    #[serde(default)]
    pub term_resolution: TermResolution,
    #[serde(default)]
    pub validation: ValidationPolicy,
    /// Articles per response, 1..=5
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Characters kept from each article body, 1..=1000
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Search term extraction timeout in milliseconds (default: 15000)
    #[serde(default = "default_extraction_timeout_ms")]
    pub extraction_timeout_ms: u64,
}

impl Default for ActionSection {
    fn default() -> Self {
        Self {
            term_resolution: TermResolution::default(),
            validation: ValidationPolicy::default(),
            max_articles: default_max_articles(),
            excerpt_chars: default_excerpt_chars(),
            extraction_timeout_ms: default_extraction_timeout_ms(),
        }
    }
}

fn default_max_articles() -> usize {
    MAX_ARTICLES
}

fn default_excerpt_chars() -> usize {
    MAX_EXCERPT_CHARS
}

fn default_extraction_timeout_ms() -> u64 {
    15_000
}

/// LLM section used by the text generation capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// Provider name (only "openai" is bundled)
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// Environment variable containing API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    /// Override for the provider API root
    pub base_url: Option<String>,
    /// Model used for `ModelClass::Small` requests such as extraction
    #[serde(default = "default_small_model")]
    pub small_model: String,
    /// Model used for `ModelClass::Medium` and `ModelClass::Large`
    #[serde(default = "default_large_model")]
    pub large_model: String,
    /// Optional temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Optional max tokens
    pub max_tokens: Option<u32>,
    /// Extra attempts after a network failure or 5xx (default: 0)
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key_env: default_llm_api_key_env(),
            base_url: None,
            small_model: default_small_model(),
            large_model: default_large_model(),
            temperature: None,
            max_tokens: None,
            max_retries: 0,
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_small_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_large_model() -> String {
    "gpt-4o".to_string()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("API key is empty or unset (env: {0})")]
    MissingApiKey(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PluginConfig {
    /// Load configuration from TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PluginConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check limits, timeouts, URLs and env var names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ARTICLES).contains(&self.action.max_articles) {
            return Err(ConfigError::InvalidConfig(format!(
                "action.max_articles must be between 1 and {MAX_ARTICLES}, got {}",
                self.action.max_articles
            )));
        }
        if !(1..=MAX_EXCERPT_CHARS).contains(&self.action.excerpt_chars) {
            return Err(ConfigError::InvalidConfig(format!(
                "action.excerpt_chars must be between 1 and {MAX_EXCERPT_CHARS}, got {}",
                self.action.excerpt_chars
            )));
        }
        if self.action.extraction_timeout_ms == 0 || self.news.timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        validate_base_url("news.base_url", &self.news.base_url)?;
        if let Some(base_url) = &self.llm.base_url {
            validate_base_url("llm.base_url", base_url)?;
        }

        validate_env_name("news.api_key_env", &self.news.api_key_env)?;
        validate_env_name("llm.api_key_env", &self.llm.api_key_env)?;

        Ok(())
    }

    /// Read a key and reject unset or blank values
    fn get_api_key(env_var_name: &str) -> Result<String, ConfigError> {
        let key = std::env::var(env_var_name)
            .map_err(|_| ConfigError::MissingApiKey(env_var_name.to_string()))?;
        if key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(env_var_name.to_string()));
        }
        Ok(key)
    }

    /// Resolve the news API key and build the client configuration
    pub fn news_api_config(&self) -> Result<NewsApiConfig, ConfigError> {
        let api_key = Self::get_api_key(&self.news.api_key_env)?;
        Ok(NewsApiConfig {
            base_url: self.news.base_url.clone(),
            api_key,
            timeout: Duration::from_millis(self.news.timeout_ms),
            retry_attempts: self.news.retry_attempts,
            language: self.news.language.clone(),
            sort_by: self.news.sort_by.clone(),
        })
    }

    /// Get LLM API key from environment variable
    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        Self::get_api_key(&self.llm.api_key_env)
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidConfig(format!("{field} '{value}' is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidConfig(format!(
            "{field} must use http or https, got {scheme}"
        ))),
    }
}

fn validate_env_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!("{field} must not be empty")));
    }
    Ok(())
}
