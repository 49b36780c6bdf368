//! Endpoint settings for each supported backend.

use secrecy::SecretString;

use palaver_types::llm::{ProviderCapabilities, ProviderKind};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Everything [`super::OpenAiCompatibleProvider::new`] needs.
pub struct OpenAiCompatConfig {
    /// "gemini" or "openai"; reported as the provider name.
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Used for requests that leave `model` empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    /// Stock endpoint and limits for `kind`.
    pub fn for_kind(kind: ProviderKind, api_key: SecretString, model: &str) -> Self {
        let (base_url, max_context_tokens, max_output_tokens) = match kind {
            ProviderKind::Gemini => (GEMINI_BASE_URL, 1_000_000, 8_192),
            ProviderKind::OpenAi => (OPENAI_BASE_URL, 128_000, 16_384),
        };

        Self {
            provider_name: kind.to_string(),
            base_url: base_url.to_string(),
            api_key,
            model: model.to_string(),
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens,
                max_output_tokens,
            },
        }
    }

    /// Send requests to another endpoint, e.g. a local proxy.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }
}
