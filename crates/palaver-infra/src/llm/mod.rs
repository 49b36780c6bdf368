//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`] trait
//! defined in `palaver-core`, and a factory ([`create_provider`]) that builds
//! it from the loaded [`ChatConfig`].
//!
//! [`LlmProvider`]: palaver_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use palaver_core::llm::box_provider::BoxLlmProvider;
use palaver_types::config::ChatConfig;
use palaver_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the chat configuration and a resolved
/// API key.
///
/// Fails when the key is empty or the configured base URL is blank.
pub fn create_provider(config: &ChatConfig, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    use secrecy::ExposeSecret;

    if api_key.expose_secret().trim().is_empty() {
        return Err(LlmError::AuthenticationFailed);
    }

    let mut provider_config = OpenAiCompatConfig::for_kind(config.provider, api_key, &config.model);
    if let Some(base_url) = config.base_url.as_deref() {
        if base_url.trim().is_empty() {
            return Err(LlmError::InvalidRequest("base_url must not be blank".to_string()));
        }
        provider_config = provider_config.with_base_url(base_url);
    }

    tracing::debug!(
        provider = %provider_config.provider_name,
        model = %provider_config.model,
        base_url = %provider_config.base_url,
        "Creating LLM provider"
    );

    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(provider_config)))
}
