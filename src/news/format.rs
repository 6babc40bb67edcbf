//! Response formatting (pure functions)

use super::Article;
use crate::config::{MAX_ARTICLES, MAX_EXCERPT_CHARS};

/// Action tag stamped on the outgoing response
pub const RESPONSE_ACTION: &str = "CURRENT_NEWS_RESPONSE";

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// `title.\ndescription.\nexcerpt` for a single article
pub fn format_article(article: &Article, excerpt_chars: usize) -> String {
    format!(
        "{}.\n{}.\n{}",
        article.title,
        article.description,
        truncate_chars(&article.content, excerpt_chars)
    )
}

/// First `max_articles` articles in received order, separated by a blank line
///
/// Both limits are capped at `MAX_ARTICLES` and `MAX_EXCERPT_CHARS`.
pub fn format_articles(articles: &[Article], max_articles: usize, excerpt_chars: usize) -> String {
    let excerpt_chars = excerpt_chars.min(MAX_EXCERPT_CHARS);
    articles
        .iter()
        .take(max_articles.min(MAX_ARTICLES))
        .map(|article| format_article(article, excerpt_chars))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Sentence handed back to the user
pub fn compose_response_text(search_term: &str, summary: &str) -> String {
    format!("The current news for the search term {search_term} is {summary}")
}
