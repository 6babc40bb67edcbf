//! Conversation memory records
//!
//! `Memory` is the unit the host persists for every message and response,
//! keyed by user, agent and room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Message body carried by a memory record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub text: String,
    /// Action tag when the content was produced by (or routed to) an action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Originating client, e.g. "discord" or "cli"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Structured parameters pre-parsed by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// A persisted conversational record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub room_id: Uuid,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// New record with a fresh id and timestamp
    pub fn new(user_id: Uuid, agent_id: Uuid, room_id: Uuid, content: Content) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            agent_id,
            room_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// A reply addressed to the same user, agent and room as `self`
    pub fn reply(&self, content: Content) -> Self {
        Self::new(self.user_id, self.agent_id, self.room_id, content)
    }
}
