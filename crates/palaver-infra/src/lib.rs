//! Infrastructure layer for Palaver.
//!
//! Implements the ports defined in `palaver-core`: the JSON and room-backed
//! history stores, the SQLite room repository, and the OpenAI-compatible LLM
//! provider. Also loads configuration and resolves the API credential.

pub mod config;
pub mod credential;
pub mod history;
pub mod llm;
pub mod sqlite;
