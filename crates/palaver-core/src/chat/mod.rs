//! Chat session orchestration: sending prompts with accumulated context and
//! draining streamed replies.

pub mod input;
pub mod session;
