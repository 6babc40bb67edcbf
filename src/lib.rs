//! Agent playground plugin
//!
//! Provides the `GET_CURRENT_NEWS` action for a conversational agent runtime.
//!
//! # Overview
//!
//! Given an incoming message the action:
//! - resolves a search term, by asking a language model or by reading a
//!   pre-parsed `searchTerm` parameter
//! - runs one search against the news API
//! - formats at most five articles, each body cut to 1000 characters
//! - stores the response in conversation memory and hands it to the callback
//!
//! The host runtime is reached only through the traits in [`runtime`].
//!
//! # Quick Start
//!
//! ```rust
//! use playground_news::news::format::{format_articles, truncate_chars};
//! use playground_news::news::Article;
//!
//! let articles = vec![
//!     Article::new("Launch", "Starship flies", "Full story"),
//!     Article::new("Landing", "Booster caught", "More"),
//! ];
//! let summary = format_articles(&articles, 5, 1000);
//! assert_eq!(summary, "Launch.\nStarship flies.\nFull story\n\nLanding.\nBooster caught.\nMore");
//! assert_eq!(truncate_chars("héllo", 2), "hé");
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod llm;
pub mod news;
pub mod observability;
pub mod plugin;
pub mod runtime;
pub mod testing;

pub use actions::{Action, ActionDescription, ActionExample, GetCurrentNewsAction};
pub use config::{ConfigError, PluginConfig, TermResolution, ValidationPolicy};
pub use error::{ActionError, ActionResult};
pub use plugin::{playground_plugin, Plugin};
pub use runtime::{AgentRuntime, Content, Memory};
