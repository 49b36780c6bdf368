//! Chat backend speaking the OpenAI chat-completions protocol.
//!
//! Gemini is reached through its OpenAI-compatible endpoint, so one client
//! type covers both [`ProviderKind`](palaver_types::llm::ProviderKind)s;
//! only the [`config::OpenAiCompatConfig`] differs.

pub mod config;
mod errors;
mod request;
pub mod streaming;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use futures_util::StreamExt;
use secrecy::ExposeSecret;

use palaver_core::llm::provider::{EventStream, LlmProvider};
use palaver_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use self::config::OpenAiCompatConfig;
use self::errors::map_openai_error;
use self::request::chat_body;
use self::streaming::{map_finish_reason, map_openai_stream};

/// No `Debug`: the client carries the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    label: String,
    default_model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let client_config = OpenAIConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(config.api_key.expose_secret());

        Self {
            client: Client::with_config(client_config),
            label: config.provider_name,
            default_model: config.model,
            capabilities: config.capabilities,
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.label
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = chat_body(request, &self.default_model, false)?;
        let response = self
            .client
            .chat()
            .create(body)
            .await
            .map_err(map_openai_error)?;

        let (content, stop_reason) = match response.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice
                    .finish_reason
                    .as_ref()
                    .map_or(StopReason::EndTurn, map_finish_reason),
            ),
            None => (String::new(), StopReason::EndTurn),
        };

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage: response.usage.map_or_else(Usage::default, |u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    fn stream(&self, request: CompletionRequest) -> EventStream {
        let body = match chat_body(&request, &self.default_model, true) {
            Ok(body) => body,
            Err(e) => return futures_util::stream::once(async move { Err(e) }).boxed(),
        };
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let source = client
                .chat()
                .create_stream(body)
                .await
                .map_err(map_openai_error)?;

            let mut events = map_openai_stream(source);
            while let Some(event) = events.next().await {
                yield event?;
            }
        })
    }
}
