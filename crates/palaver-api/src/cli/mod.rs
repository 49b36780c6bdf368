//! CLI command definitions for the `palaver` binary.
//!
//! Uses clap derive macros. Running `palaver` with no subcommand starts the
//! chat REPL.

pub mod chat;
pub mod history;
pub mod palette;
pub mod room;
pub mod rooms;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use palaver_types::config::ChatConfig;
use palaver_types::llm::ProviderKind;

/// Chat with an LLM from your terminal.
#[derive(Parser)]
#[command(name = "palaver", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Disable colored output.
    #[arg(long, global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Command-line overrides applied on top of `config.toml`.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// LLM backend (gemini or openai).
    #[arg(long, global = true, env = "PALAVER_PROVIDER")]
    pub provider: Option<ProviderKind>,

    /// Model identifier.
    #[arg(long, global = true, env = "PALAVER_MODEL")]
    pub model: Option<String>,

    /// JSON history file.
    #[arg(long = "history-file", global = true)]
    pub history_file: Option<PathBuf>,

    /// SQLite database holding chat rooms.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Wait for complete replies instead of streaming.
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Print streamed text as it arrives, before the rendered reply.
    #[arg(long, global = true)]
    pub echo_stream: bool,

    /// Column at which rendered markdown wraps.
    #[arg(long, global = true)]
    pub wrap: Option<usize>,
}

impl ConfigOverrides {
    /// Apply the overrides that were given to `config`.
    pub fn apply(&self, config: &mut ChatConfig) {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        if let Some(ref path) = self.history_file {
            config.history_file = path.display().to_string();
        }
        if let Some(ref path) = self.database {
            config.database_file = path.display().to_string();
        }
        if self.no_stream {
            config.streaming = false;
        }
        if self.echo_stream {
            config.echo_stream = true;
        }
        if let Some(wrap) = self.wrap {
            config.wrap_width = wrap;
        }
    }
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Start the interactive chat REPL (default).
    Chat(ChatArgs),

    /// Browse chat rooms in a full-screen terminal UI.
    Rooms,

    /// Manage chat rooms.
    Room {
        #[command(subcommand)]
        action: RoomCommand,
    },

    /// Show the saved chat history.
    History {
        /// Number of most recent messages to show.
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ChatArgs {
    /// Continue a database chat room instead of the JSON history file.
    #[arg(long)]
    pub room: Option<i64>,

    /// System prompt sent with every request.
    #[arg(long)]
    pub system: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum RoomCommand {
    /// List all chat rooms.
    #[command(alias = "ls")]
    List,

    /// Create a chat room.
    Create {
        /// Room name.
        name: String,
    },

    /// Print a room's transcript.
    Show {
        /// Room id.
        id: i64,
    },
}
