//! Interactive chat REPL.
//!
//! Wires the configured provider, the history store (JSON file or a
//! database room), the renderer and the readline input into
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use anyhow::Context;

use palaver_core::chat::session::{ChatSession, SessionOptions};
use palaver_core::history::HistoryStore;
use palaver_core::llm::box_provider::BoxLlmProvider;
use palaver_core::room::RoomRepository;
use palaver_infra::history::room::RoomHistoryStore;
use palaver_types::config::ChatConfig;
use palaver_types::llm::ProviderKind;

use crate::cli::ChatArgs;
use crate::cli::palette::Palette;
use crate::state::AppState;

use self::banner::print_welcome_banner;
use self::input::ChatInput;
use self::loop_runner::{LoopUi, run_chat_loop};

/// Run the REPL until the user leaves.
pub async fn run(state: &AppState, palette: &Palette, args: &ChatArgs) -> anyhow::Result<()> {
    let provider = state.create_provider()?;

    match args.room {
        Some(room_id) => {
            let repo = state.open_rooms().await?;
            let room = repo
                .get_room(room_id)
                .await
                .context("failed to look up chat room")?
                .ok_or_else(|| anyhow::anyhow!("chat room {room_id} not found"))?;
            let store = RoomHistoryStore::new(repo, room);
            run_with_store(state, palette, args, provider, store).await
        }
        None => run_with_store(state, palette, args, provider, state.history_store()).await,
    }
}

async fn run_with_store<H: HistoryStore>(
    state: &AppState,
    palette: &Palette,
    args: &ChatArgs,
    provider: BoxLlmProvider,
    mut store: H,
) -> anyhow::Result<()> {
    let history = store.load().await;
    let options = session_options(&state.config, args);
    let label = assistant_label(state.config.provider);

    print_welcome_banner(
        palette,
        label,
        &options.model,
        &store.describe(),
        history.len(),
    );

    let mut session = ChatSession::new(provider, options, history);
    let renderer = state.renderer(palette);

    let prompt = format!("{} ", palette.user("You:"));
    let (mut input, _writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let ui = LoopUi {
        palette,
        renderer: &renderer,
        assistant_label: label,
        echo_stream: state.config.echo_stream,
    };
    let exit = run_chat_loop(&mut session, &mut store, &mut input, &ui).await;

    tracing::info!(
        reason = ?exit,
        messages = session.history().len(),
        "Chat session ended"
    );
    Ok(())
}

/// Session settings from the effective config; `--system` wins over the file.
pub fn session_options(config: &ChatConfig, args: &ChatArgs) -> SessionOptions {
    SessionOptions {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        system_prompt: args.system.clone().or_else(|| config.system_prompt.clone()),
        streaming: config.streaming,
        max_stream_events: config.max_stream_events,
    }
}

/// Speaker label printed before replies.
pub fn assistant_label(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "Gemini",
        ProviderKind::OpenAi => "OpenAI",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_from_config() {
        let config = ChatConfig {
            system_prompt: Some("be brief".to_string()),
            ..ChatConfig::default()
        };
        let options = session_options(&config, &ChatArgs::default());
        assert_eq!(options.model, config.model);
        assert_eq!(options.max_tokens, 8192);
        assert!(options.streaming);
        assert_eq!(options.system_prompt.as_deref(), Some("be brief"));
    }

    #[test]
    fn test_system_flag_overrides_config() {
        let config = ChatConfig {
            system_prompt: Some("be brief".to_string()),
            ..ChatConfig::default()
        };
        let args = ChatArgs {
            room: None,
            system: Some("be verbose".to_string()),
        };
        let options = session_options(&config, &args);
        assert_eq!(options.system_prompt.as_deref(), Some("be verbose"));
    }

    #[test]
    fn test_assistant_label() {
        assert_eq!(assistant_label(ProviderKind::Gemini), "Gemini");
        assert_eq!(assistant_label(ProviderKind::OpenAi), "OpenAI");
    }
}
