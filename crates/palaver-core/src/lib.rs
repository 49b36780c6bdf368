//! Chat logic and port definitions for Palaver.
//!
//! This crate defines the traits the infrastructure layer implements
//! (`LlmProvider`, `HistoryStore`, `RoomRepository`) and the `ChatSession`
//! that drives a conversation. It depends only on `palaver-types`, never on
//! `palaver-infra` or any database/IO crate.

pub mod chat;
pub mod history;
pub mod llm;
pub mod room;
