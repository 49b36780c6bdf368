//! The provider port.
//!
//! A provider answers a [`CompletionRequest`] either in one piece
//! (`complete`) or as a stream of [`StreamEvent`]s (`stream`).

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use palaver_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Stream of reply events. Owned (`'static`) so it can outlive the request.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// A chat model backend.
///
/// Implemented in palaver-infra by `OpenAiCompatibleProvider` and by the
/// scripted providers in tests.
pub trait LlmProvider: Send + Sync {
    /// Short identifier, e.g. "gemini".
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Start a streamed reply. A successful stream ends with
    /// [`StreamEvent::Done`]; transport failures arrive as `Err` items.
    fn stream(&self, request: CompletionRequest) -> EventStream;
}
