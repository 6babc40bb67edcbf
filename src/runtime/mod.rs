//! Host runtime boundary
//!
//! The action never talks to the host directly. It consumes three
//! capabilities through traits: text generation, memory creation and a
//! response callback. `AgentRuntime` bundles the first two the way the host
//! hands them to every handler; the callback is passed per invocation.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::llm::LlmError;

pub mod memory;

pub use memory::{Content, Memory};

/// Model size tier requested by a generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Small,
    Medium,
    Large,
}

/// Parameters for a single text generation
#[derive(Debug, Clone)]
pub struct TextGenerationRequest {
    pub context: String,
    pub model_class: ModelClass,
    pub stop: Vec<String>,
}

/// Host `generateText` capability: prompt in, bare string out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String, LlmError>;
}

/// Host memory-creation capability
#[async_trait]
pub trait MemoryManager: Send + Sync {
    async fn create_memory(&self, memory: Memory) -> Result<(), RuntimeError>;
}

/// Host completion callback, receives the response content
#[async_trait]
pub trait ResponseCallback: Send + Sync {
    async fn send(&self, content: &Content) -> Result<(), RuntimeError>;
}

/// Failures reported by host capabilities
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Memory creation failed: {0}")]
    MemoryFailed(String),
    #[error("Callback failed: {0}")]
    CallbackFailed(String),
}

/// Capabilities the host exposes to an action handler
#[derive(Clone)]
pub struct AgentRuntime {
    agent_id: Uuid,
    text_generator: Arc<dyn TextGenerator>,
    message_manager: Arc<dyn MemoryManager>,
}

impl AgentRuntime {
    pub fn new(
        agent_id: Uuid,
        text_generator: Arc<dyn TextGenerator>,
        message_manager: Arc<dyn MemoryManager>,
    ) -> Self {
        Self {
            agent_id,
            text_generator,
            message_manager,
        }
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    pub fn text_generator(&self) -> &dyn TextGenerator {
        self.text_generator.as_ref()
    }

    pub fn message_manager(&self) -> &dyn MemoryManager {
        self.message_manager.as_ref()
    }
}

/// Process-local memory manager, records are kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryMemoryManager {
    memories: Mutex<Vec<Memory>>,
}

impl InMemoryMemoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn memories(&self) -> Vec<Memory> {
        self.memories.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.memories.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memories.lock().await.is_empty()
    }
}

#[async_trait]
impl MemoryManager for InMemoryMemoryManager {
    async fn create_memory(&self, memory: Memory) -> Result<(), RuntimeError> {
        tracing::debug!(memory_id = %memory.id, room_id = %memory.room_id, "Memory created");
        self.memories.lock().await.push(memory);
        Ok(())
    }
}

/// Callback that prints response text to stdout
#[derive(Debug, Default)]
pub struct StdoutCallback;

#[async_trait]
impl ResponseCallback for StdoutCallback {
    async fn send(&self, content: &Content) -> Result<(), RuntimeError> {
        println!("{}", content.text);
        Ok(())
    }
}
