//! Action contract
//!
//! An action is the host-discoverable unit of behaviour: metadata used for
//! intent matching and few-shot selection, a validation predicate, and a
//! handler that does the work and reports back through the runtime.

use crate::error::ActionResult;
use crate::runtime::{AgentRuntime, Content, Memory, ResponseCallback};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod current_news;

pub use current_news::GetCurrentNewsAction;

/// One turn of a few-shot example exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExample {
    /// Speaker placeholder, e.g. `{{user1}}`
    pub user: String,
    pub content: Content,
}

/// Discovery metadata exposed to the host
#[derive(Debug, Clone, Serialize)]
pub struct ActionDescription {
    pub name: String,
    pub similes: Vec<String>,
    pub description: String,
    pub examples: Vec<Vec<ActionExample>>,
    /// JSON Schema for `content.params`, when the action reads any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ActionDescription {
    /// True if `candidate` is the action name or one of its similes
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.name.eq_ignore_ascii_case(candidate)
            || self.similes.iter().any(|s| s.eq_ignore_ascii_case(candidate))
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    /// Name, aliases, description, examples and parameter schema
    fn describe(&self) -> ActionDescription;

    /// Whether this action applies to `message`
    async fn validate(&self, runtime: &AgentRuntime, message: &Memory) -> bool;

    /// Run the action. `Ok(true)` on completion. Extraction, retrieval and
    /// timeout failures return before any memory is written or the callback
    /// is invoked.
    async fn handler(
        &self,
        runtime: &AgentRuntime,
        message: &Memory,
        callback: &dyn ResponseCallback,
    ) -> ActionResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> ActionDescription {
        ActionDescription {
            name: "GET_CURRENT_NEWS".to_string(),
            similes: vec!["NEWS".to_string(), "LATEST_NEWS".to_string()],
            description: "news".to_string(),
            examples: vec![],
            parameters: None,
        }
    }

    #[test]
    fn test_matches_name_and_similes() {
        let description = description();
        assert!(description.matches("GET_CURRENT_NEWS"));
        assert!(description.matches("latest_news"));
        assert!(description.matches(" NEWS "));
        assert!(!description.matches("WEATHER"));
    }

    #[test]
    fn test_description_serialization_skips_missing_schema() {
        let value = serde_json::to_value(description()).unwrap();
        assert_eq!(value["name"], "GET_CURRENT_NEWS");
        assert!(value.get("parameters").is_none());
    }
}
