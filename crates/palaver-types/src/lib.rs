//! Shared domain types for Palaver.
//!
//! Conversation history, chat rooms, LLM request/stream shapes, configuration,
//! and error enums. Zero infrastructure dependencies: only serde, chrono,
//! thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod room;
