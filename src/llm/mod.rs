//! LLM layer
//!
//! Provider-agnostic completion interface plus the adapter that exposes it
//! to actions as the host text generation capability.

pub mod provider;
pub mod providers;
pub mod text;

pub use provider::*;
pub use providers::*;
pub use text::LlmTextGenerator;
