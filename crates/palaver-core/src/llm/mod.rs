//! Model provider port (`LlmProvider`) and its type-erased holder
//! (`BoxLlmProvider`).

pub mod box_provider;
pub mod provider;
