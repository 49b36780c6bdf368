//! Full-screen chat room browser (`palaver rooms`).
//!
//! Lists the rooms in the database; Enter opens a read-only, scrollable
//! transcript. The terminal is put in raw mode on the alternate screen with
//! mouse capture, and restored by [`TerminalGuard`] on every exit path.

pub mod app;
pub mod draw;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context;
use ratatui::crossterm::ExecutableCommand;
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use tracing::{info, warn};

use palaver_core::room::RoomRepository;

use crate::state::AppState;

use self::app::{Action, BrowserApp};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Restores the terminal when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        io::stdout().execute(EnterAlternateScreen)?;
        io::stdout().execute(EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Run the room browser until the user quits.
pub async fn run_browser(state: &AppState) -> anyhow::Result<()> {
    let repo = state.open_rooms().await?;
    let rooms = repo.list_rooms().await.context("failed to load chat rooms")?;
    info!(rooms = rooms.len(), "Starting room browser");

    let mut app = BrowserApp::new(rooms);

    let _guard = TerminalGuard::enter().context("failed to prepare terminal")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let result = run_tui_loop(&mut terminal, &mut app, &repo).await;
    let _ = terminal.show_cursor();

    info!("Room browser closed");
    result
}

async fn run_tui_loop<R: RoomRepository>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut BrowserApp,
    repo: &R,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| draw::draw(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let ev = event::read()?;
        match app.handle_event(&ev) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::OpenRoom(room_id) => load_room(app, repo, room_id).await,
        }
    }
}

/// Fetch a room's messages and switch the browser to it. A failed load is
/// shown in the footer and the list stays open.
pub(crate) async fn load_room<R: RoomRepository>(app: &mut BrowserApp, repo: &R, room_id: i64) {
    match repo.list_messages(room_id).await {
        Ok(messages) => {
            info!(room_id, messages = messages.len(), "Opened chat room");
            app.open_room(room_id, messages);
        }
        Err(e) => {
            warn!(room_id, error = %e, "Failed to load room messages");
            app.set_status(format!("Failed to load messages: {e}"));
        }
    }
}
