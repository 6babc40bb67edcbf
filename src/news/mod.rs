//! News search
//!
//! `NewsSource` is the seam between the action and the third-party search
//! API; `NewsApiClient` is the HTTP implementation and `format` turns the
//! returned articles into response text.

use crate::error::ActionResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod format;

pub use client::{NewsApiClient, NewsApiConfig};

/// One search result as used for formatting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            content: content.into(),
        }
    }
}

/// Source of news articles for a search term
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching `term`, in the order the source ranks them
    ///
    /// The HTTP client returns at most `MAX_ARTICLES`; mocks may return more.
    async fn search(&self, term: &str) -> ActionResult<Vec<Article>>;
}
