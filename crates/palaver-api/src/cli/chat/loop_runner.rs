//! The REPL loop.
//!
//! Reads a line, handles the exit keyword and slash commands, sends prompts
//! through the session and prints the rendered reply. A reply is persisted
//! right after it is shown; empty and failed turns are reported inline and
//! never saved.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use palaver_core::chat::input::is_exit_keyword;
use palaver_core::chat::session::{ChatSession, SendOutcome};
use palaver_core::history::HistoryStore;
use palaver_types::chat::{ChatHistory, MessageRole};

use crate::cli::palette::Palette;

use super::commands::{self, ChatCommand};
use super::input::{InputEvent, InputSource};
use super::renderer::{MarkdownRenderer, format_stats_footer};

/// Messages shown by `/history`.
const HISTORY_PREVIEW_COUNT: usize = 20;
/// Characters kept per message in `/history`.
const PREVIEW_CHARS: usize = 100;

/// Presentation pieces the loop prints with.
pub struct LoopUi<'a> {
    pub palette: &'a Palette,
    pub renderer: &'a MarkdownRenderer,
    pub assistant_label: &'a str,
    /// Print streamed deltas raw as they arrive.
    pub echo_stream: bool,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    EndOfInput,
    ExitKeyword,
    ExitCommand,
}

pub async fn run_chat_loop<I, H>(
    session: &mut ChatSession,
    store: &mut H,
    input: &mut I,
    ui: &LoopUi<'_>,
) -> LoopExit
where
    I: InputSource,
    H: HistoryStore,
{
    let palette = ui.palette;

    loop {
        let text = match input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", palette.dim("Session ended."));
                return LoopExit::EndOfInput;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    palette.dim("Press Ctrl+D or type 'exit' to quit, or keep chatting.")
                );
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if text.is_empty() {
            continue;
        }

        if is_exit_keyword(&text) {
            println!("{}", palette.success("Exiting chat..."));
            return LoopExit::ExitKeyword;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(palette),
                ChatCommand::Clear => input.clear(),
                ChatCommand::Exit => {
                    println!("{}", palette.success("Exiting chat..."));
                    return LoopExit::ExitCommand;
                }
                ChatCommand::History => print_recent(session.history(), ui),
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        palette.warning("?"),
                        palette.dim(name)
                    );
                }
            }
            continue;
        }

        handle_prompt(session, store, &text, ui).await;
    }
}

async fn handle_prompt<H: HistoryStore>(
    session: &mut ChatSession,
    store: &mut H,
    text: &str,
    ui: &LoopUi<'_>,
) {
    let palette = ui.palette;
    let label = format!("{}:", ui.assistant_label);
    let spinner = thinking_spinner();
    let mut echoed = false;

    let outcome = session
        .send(text, |delta| {
            if !ui.echo_stream {
                return;
            }
            if !echoed {
                spinner.finish_and_clear();
                print!("\n{} ", palette.dim(&label));
                echoed = true;
            }
            print!("{delta}");
            let _ = std::io::stdout().flush();
        })
        .await;

    spinner.finish_and_clear();
    if echoed {
        println!();
    }

    match outcome {
        SendOutcome::Reply(reply) => {
            let rendered = ui.renderer.render(&reply.text);
            println!("\n{}", palette.assistant(&label));
            println!("{}", rendered.trim_end());
            if reply.truncated {
                println!(
                    "  {}",
                    palette.warning("(reply cut short: stream event limit reached)")
                );
            } else if let Some(reason) = reply.stop_reason.as_ref().filter(|r| r.is_truncation()) {
                println!("  {}", palette.warning(format!("(reply stopped early: {reason})")));
            }
            println!();
            println!(
                "{}",
                format_stats_footer(
                    palette,
                    reply.usage.output_tokens,
                    reply.elapsed,
                    &session.options().model
                )
            );
            println!();

            match store.save(session.history()).await {
                Ok(()) => info!(
                    store = %store.describe(),
                    messages = session.history().len(),
                    "Chat history saved"
                ),
                Err(e) => {
                    warn!(store = %store.describe(), error = %e, "Chat history not saved");
                    println!(
                        "  {}\n",
                        palette.dim(format!("History not saved ({e}); will retry after the next reply."))
                    );
                }
            }
        }
        SendOutcome::Empty => {
            println!(
                "{}",
                palette.error(format!(
                    "{label} No response received. The AI model might be experiencing issues."
                ))
            );
        }
        SendOutcome::Failed { error, partial } => {
            if !partial.is_empty() {
                warn!(chars = partial.len(), "Discarding partial reply after stream error");
            }
            println!(
                "{}",
                palette.error(format!("Error occurred while receiving response: {error}"))
            );
            println!("  {}", palette.dim("Type a message to retry, 'exit' to quit."));
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_recent(history: &ChatHistory, ui: &LoopUi<'_>) {
    let palette = ui.palette;
    println!();
    if history.is_empty() {
        println!("  {}\n", palette.dim("No messages yet."));
        return;
    }
    for msg in history.tail(HISTORY_PREVIEW_COUNT) {
        let label = match msg.role {
            MessageRole::User => palette.user("You").to_string(),
            MessageRole::Assistant => palette.assistant(ui.assistant_label).to_string(),
            MessageRole::System => palette.dim("System").to_string(),
        };
        println!("  {label} {}", preview(&msg.content, PREVIEW_CHARS));
    }
    println!();
}

/// One-line preview of at most `max` characters.
pub fn preview(content: &str, max: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
