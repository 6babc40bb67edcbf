//! Testing utilities and mock implementations
//!
//! Mocks for the host runtime, the language model and the news API so the
//! action can be tested without network access.

pub mod mocks;

pub use mocks::*;
