//! Error types for the news lookup action
//!
//! Every variant is terminal for the current handler invocation: nothing is
//! written to memory and the callback is never invoked once one is raised.

use crate::config::ConfigError;
use crate::runtime::RuntimeError;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Main error type for action handling
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Search term extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("News retrieval failed: {message}")]
    RetrievalError { message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    #[error("{operation} timed out after {timeout_ms}ms")]
    TimeoutError { operation: String, timeout_ms: u64 },

    #[error("Host runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl ActionError {
    /// Create extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::ExtractionError {
            message: message.into(),
        }
    }

    /// Create retrieval error
    pub fn retrieval<S: Into<String>>(message: S) -> Self {
        Self::RetrievalError {
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout<S: Into<String>>(operation: S, timeout_ms: u64) -> Self {
        Self::TimeoutError {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Short stable label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::ExtractionError { .. } => "extraction",
            ActionError::RetrievalError { .. } => "retrieval",
            ActionError::ConfigurationError(_) => "configuration",
            ActionError::TimeoutError { .. } => "timeout",
            ActionError::Runtime(_) => "runtime",
        }
    }

    /// Display form with secrets redacted, safe to hand back to the host
    pub fn sanitized_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*[^\s&]+").expect("valid secret pattern")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("valid path pattern")
});

const MAX_MESSAGE_LEN: usize = 500;

/// Sanitize error messages so API keys never reach logs or the host
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PATTERN
        .replace_all(message, "${1}=***")
        .to_string();

    sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    // Total length stays <= 500 bytes, cut on a char boundary
    if sanitized.len() > MAX_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;
