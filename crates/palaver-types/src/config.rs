//! Configuration types for Palaver.
//!
//! `ChatConfig` is the top-level `config.toml` that controls the provider,
//! model, storage paths, and rendering. Every field has a default so a
//! missing or partial file is always usable.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration, loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Backend speaking the OpenAI chat completions protocol.
    pub provider: ProviderKind,
    /// Model identifier sent with every request.
    pub model: String,
    /// Override for the provider's default base URL.
    pub base_url: Option<String>,
    /// Environment variable holding the API credential.
    pub api_key_env: String,
    /// JSON history file, relative to the working directory unless absolute.
    pub history_file: String,
    /// SQLite database holding chat rooms.
    pub database_file: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub system_prompt: Option<String>,
    /// Stream replies instead of waiting for a unary response.
    pub streaming: bool,
    /// Print raw deltas while a reply streams in, before the rendered copy.
    pub echo_stream: bool,
    /// Column at which rendered markdown wraps.
    pub wrap_width: usize,
    /// syntect theme for fenced code blocks.
    pub code_theme: String,
    /// Upper bound on stream events drained for a single reply.
    pub max_stream_events: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            history_file: "chat_history.json".to_string(),
            database_file: "chat.db".to_string(),
            max_tokens: 8192,
            temperature: None,
            system_prompt: None,
            streaming: true,
            echo_stream: false,
            wrap_width: 100,
            code_theme: "base16-ocean.dark".to_string(),
            max_stream_events: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ChatConfig::default();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.history_file, "chat_history.json");
        assert!(config.streaming);
        assert!(!config.echo_stream);
        assert_eq!(config.wrap_width, 100);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ChatConfig = toml::from_str(
            r#"
provider = "openai"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
temperature = 0.3
"#,
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, Some(0.3));
        assert_eq!(config.history_file, "chat_history.json");
        assert_eq!(config.max_stream_events, 10_000);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChatConfig::default());
    }
}
