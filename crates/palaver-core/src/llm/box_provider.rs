//! Runtime-selected provider.
//!
//! `LlmProvider::complete` returns `impl Future`, which rules out
//! `dyn LlmProvider`. `ErasedProvider` is the object-safe mirror with a boxed
//! future, implemented for every provider, and `BoxLlmProvider` holds one.

use std::future::Future;
use std::pin::Pin;

use palaver_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::{EventStream, LlmProvider};

type CompleteFuture<'a> = Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

trait ErasedProvider: Send + Sync {
    fn erased_name(&self) -> &str;
    fn erased_capabilities(&self) -> &ProviderCapabilities;
    fn erased_complete<'a>(&'a self, request: &'a CompletionRequest) -> CompleteFuture<'a>;
    fn erased_stream(&self, request: CompletionRequest) -> EventStream;
}

impl<P: LlmProvider> ErasedProvider for P {
    fn erased_name(&self) -> &str {
        self.name()
    }

    fn erased_capabilities(&self) -> &ProviderCapabilities {
        self.capabilities()
    }

    fn erased_complete<'a>(&'a self, request: &'a CompletionRequest) -> CompleteFuture<'a> {
        Box::pin(self.complete(request))
    }

    fn erased_stream(&self, request: CompletionRequest) -> EventStream {
        self.stream(request)
    }
}

/// Owned, type-erased [`LlmProvider`].
pub struct BoxLlmProvider(Box<dyn ErasedProvider>);

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self(Box::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.erased_name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.0.erased_capabilities()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.0.erased_complete(request).await
    }

    pub fn stream(&self, request: CompletionRequest) -> EventStream {
        self.0.erased_stream(request)
    }
}
