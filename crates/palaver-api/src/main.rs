//! Palaver command-line entry point.
//!
//! Binary name: `palaver`
//!
//! Parses CLI arguments, sets up logging, loads configuration, then
//! dispatches to the chat REPL, the room browser or a management command.

mod cli;
mod state;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use palaver_infra::config::{log_file_path, resolve_data_dir};
use palaver_observe::tracing_setup::{LogTarget, default_filter, init_tracing, shutdown_tracing};

use cli::palette::Palette;
use cli::{ChatArgs, Cli, Commands, RoomCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Chat(ChatArgs::default()));

    // Shell completions don't need logging or state
    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "palaver", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();

    // The room browser owns the whole screen, so its logs go to a file.
    let tui = matches!(command, Commands::Rooms);
    let target = if tui {
        LogTarget::File(log_file_path(&data_dir))
    } else {
        LogTarget::Stderr
    };
    init_tracing(target, default_filter(cli.verbose, cli.quiet), cli.otel && !tui)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let result = run(cli, command, data_dir).await;

    shutdown_tracing();
    result
}

async fn run(cli: Cli, command: Commands, data_dir: std::path::PathBuf) -> anyhow::Result<()> {
    let state = AppState::init(data_dir, &cli.overrides).await?;
    let palette = Palette::new(!cli.no_color);

    match command {
        Commands::Chat(args) => cli::chat::run(&state, &palette, &args).await?,

        Commands::Rooms => cli::rooms::run_browser(&state).await?,

        Commands::Room { action } => match action {
            RoomCommand::List => cli::room::list_rooms(&state, &palette, cli.json).await?,
            RoomCommand::Create { name } => {
                cli::room::create_room(&state, &palette, &name, cli.json).await?;
            }
            RoomCommand::Show { id } => {
                cli::room::show_room(&state, &palette, id, cli.json).await?;
            }
        },

        Commands::History { limit } => {
            cli::history::show_history(&state, &palette, limit, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled before startup"),
    }

    Ok(())
}
