//! Room browser state and event handling.
//!
//! `BrowserApp` is a plain state machine: events go in, an [`Action`] comes
//! out, and the caller performs any I/O the action asks for. Drawing lives in
//! `draw.rs`.

use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListState;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use palaver_types::chat::MessageRole;
use palaver_types::room::{ChatRoom, RoomMessage};

use super::draw::body_inner_size;

/// Lines moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;
/// Indent of message bodies under their speaker line.
const BODY_INDENT: &str = "  ";

/// What the browser is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    RoomList,
    ChatView { room: ChatRoom },
}

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Load this room's messages and pass them to [`BrowserApp::open_room`].
    OpenRoom(i64),
}

pub struct BrowserApp {
    rooms: Vec<ChatRoom>,
    pub(super) list_state: ListState,
    screen: Screen,
    messages: Vec<RoomMessage>,
    transcript: Vec<Line<'static>>,
    scroll: usize,
    viewport_width: usize,
    viewport_height: usize,
    status: Option<String>,
}

impl BrowserApp {
    pub fn new(rooms: Vec<ChatRoom>) -> Self {
        let mut list_state = ListState::default();
        if !rooms.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            rooms,
            list_state,
            screen: Screen::RoomList,
            messages: Vec::new(),
            transcript: Vec::new(),
            scroll: 0,
            viewport_width: 0,
            viewport_height: 0,
            status: None,
        }
    }

    pub fn rooms(&self) -> &[ChatRoom] {
        &self.rooms
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn messages(&self) -> &[RoomMessage] {
        &self.messages
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript.len()
    }

    /// Transcript lines that fit the viewport at the current scroll offset.
    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        self.transcript
            .iter()
            .skip(self.scroll)
            .take(self.viewport_height)
            .cloned()
            .collect()
    }

    /// How far down the transcript the viewport is, 0 to 100. A transcript
    /// that fits entirely counts as fully scrolled.
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_scroll();
        if max == 0 {
            return 100.0;
        }
        self.scroll as f64 / max as f64 * 100.0
    }

    pub fn handle_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Action::None
            }
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Recompute the viewport for a terminal of `width` x `height` cells.
    pub fn resize(&mut self, width: u16, height: u16) {
        let (body_width, body_height) = body_inner_size(width, height);
        let width_changed = body_width != self.viewport_width;
        self.viewport_width = body_width;
        self.viewport_height = body_height;

        if width_changed && matches!(self.screen, Screen::ChatView { .. }) {
            self.rebuild_transcript();
        }
        self.clamp_scroll();
    }

    /// Show `room_id` with its messages (already in chronological order).
    pub fn open_room(&mut self, room_id: i64, messages: Vec<RoomMessage>) {
        let Some(room) = self.rooms.iter().find(|r| r.id == room_id).cloned() else {
            self.set_status(format!("Room {room_id} no longer exists"));
            return;
        };
        self.screen = Screen::ChatView { room };
        self.messages = messages;
        self.scroll = 0;
        self.status = None;
        self.rebuild_transcript();
    }

    fn back_to_list(&mut self) {
        self.screen = Screen::RoomList;
        self.messages.clear();
        self.transcript.clear();
        self.scroll = 0;
        self.status = None;
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.screen {
            Screen::RoomList => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.select_previous();
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.select_next();
                    Action::None
                }
                KeyCode::Enter => self
                    .selected_room()
                    .map_or(Action::None, |room| Action::OpenRoom(room.id)),
                _ => Action::None,
            },
            Screen::ChatView { .. } => {
                let page = self.viewport_height.max(1);
                match key.code {
                    KeyCode::Char('q') => return Action::Quit,
                    KeyCode::Esc => self.back_to_list(),
                    KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1),
                    KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
                    KeyCode::PageUp => self.scroll_up(page),
                    KeyCode::PageDown => self.scroll_down(page),
                    KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
                    KeyCode::End | KeyCode::Char('G') => self.scroll = self.max_scroll(),
                    _ => {}
                }
                Action::None
            }
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        match self.screen {
            Screen::RoomList => match mouse.kind {
                MouseEventKind::ScrollUp => self.select_previous(),
                MouseEventKind::ScrollDown => self.select_next(),
                _ => {}
            },
            Screen::ChatView { .. } => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_up(WHEEL_STEP),
                MouseEventKind::ScrollDown => self.scroll_down(WHEEL_STEP),
                _ => {}
            },
        }
    }

    fn selected_room(&self) -> Option<&ChatRoom> {
        self.list_state.selected().and_then(|i| self.rooms.get(i))
    }

    fn select_next(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let last = self.rooms.len() - 1;
        let i = self.list_state.selected().map_or(0, |i| (i + 1).min(last));
        self.list_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    fn max_scroll(&self) -> usize {
        self.transcript.len().saturating_sub(self.viewport_height)
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn rebuild_transcript(&mut self) {
        let width = self.viewport_width.saturating_sub(BODY_INDENT.len()).max(10);
        let mut lines = Vec::new();

        for msg in &self.messages {
            let (label, color) = match msg.role {
                MessageRole::User => ("You", Color::Green),
                MessageRole::Assistant => ("Assistant", Color::Cyan),
                MessageRole::System => ("System", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    label,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", msg.created_at.format("%Y-%m-%d %H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            for row in wrap_text(&msg.content, width) {
                lines.push(Line::from(format!("{BODY_INDENT}{row}")));
            }
            lines.push(Line::default());
        }

        if lines.is_empty() {
            lines.push(Line::styled(
                "No messages in this room yet.",
                Style::default().fg(Color::DarkGray),
            ));
        }

        self.transcript = lines;
        self.clamp_scroll();
    }
}

/// Word-wrap `text` to `width` display columns. Blank lines and leading
/// indentation are kept; words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for raw in text.lines() {
        let indent_len = raw.len() - raw.trim_start().len();
        let indent = &raw[..indent_len];
        if raw.trim().is_empty() {
            rows.push(String::new());
            continue;
        }

        let mut current = indent.to_string();
        let mut current_width = indent.width();
        let mut has_word = false;

        for word in raw.split_whitespace() {
            let word_width = word.width();

            if has_word && current_width + 1 + word_width > width {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
                has_word = false;
            }

            if word_width > width.saturating_sub(current_width) {
                if has_word {
                    rows.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if current_width + ch_width > width && current_width > 0 {
                        rows.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
                has_word = true;
                continue;
            }

            if has_word {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            has_word = true;
        }

        rows.push(current);
    }

    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone, Utc};
    use ratatui::crossterm::event::{KeyEventState, MouseButton};

    use palaver_core::room::RoomRepository;
    use palaver_infra::sqlite::pool::DatabasePool;
    use palaver_infra::sqlite::room::SqliteRoomRepository;

    use crate::cli::rooms::load_room;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl_c() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
    }

    fn wheel(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn room(id: i64, name: &str) -> ChatRoom {
        ChatRoom {
            id,
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn message(id: i64, room_id: i64, content: &str) -> RoomMessage {
        RoomMessage {
            id,
            chat_room_id: room_id,
            role: MessageRole::User,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::seconds(id),
        }
    }

    fn app_in_room(message_count: i64) -> BrowserApp {
        let mut app = BrowserApp::new(vec![room(1, "general")]);
        app.resize(80, 24);
        let messages = (1..=message_count)
            .map(|i| message(i, 1, &format!("message {i}")))
            .collect();
        app.open_room(1, messages);
        app
    }

    async fn repo() -> SqliteRoomRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("rooms.db");
        std::mem::forget(dir);
        SqliteRoomRepository::new(DatabasePool::open(&db_path).await.unwrap())
    }

    #[tokio::test]
    async fn test_select_room_opens_chronological_chat_view() {
        let repo = repo().await;
        repo.create_room("first").await.unwrap();
        let second = repo.create_room("second").await.unwrap();

        let base = Utc::now();
        repo.append_message(second.id, MessageRole::Assistant, "third", base + Duration::seconds(20))
            .await
            .unwrap();
        repo.append_message(second.id, MessageRole::User, "first", base)
            .await
            .unwrap();
        repo.append_message(second.id, MessageRole::User, "second", base + Duration::seconds(10))
            .await
            .unwrap();

        let mut app = BrowserApp::new(repo.list_rooms().await.unwrap());
        app.resize(80, 24);

        assert_eq!(app.handle_event(&key(KeyCode::Down)), Action::None);
        let action = app.handle_event(&key(KeyCode::Enter));
        assert_eq!(action, Action::OpenRoom(second.id));

        load_room(&mut app, &repo, second.id).await;

        match app.screen() {
            Screen::ChatView { room } => assert_eq!(room.name, "second"),
            Screen::RoomList => panic!("expected chat view"),
        }
        let contents: Vec<&str> = app.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_escape_returns_to_list_and_clears_buffer() {
        let mut app = app_in_room(5);
        assert!(app.transcript_len() > 0);

        assert_eq!(app.handle_event(&key(KeyCode::Esc)), Action::None);

        assert_eq!(app.screen(), &Screen::RoomList);
        assert!(app.messages().is_empty());
        assert_eq!(app.transcript_len(), 0);
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = BrowserApp::new(vec![room(1, "general")]);
        assert_eq!(app.handle_event(&key(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_event(&ctrl_c()), Action::Quit);

        let mut app = app_in_room(2);
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_event(&ctrl_c()), Action::Quit);
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut app = BrowserApp::new(Vec::new());
        assert_eq!(app.handle_event(&key(KeyCode::Enter)), Action::None);
        assert_eq!(app.handle_event(&key(KeyCode::Down)), Action::None);
        assert_eq!(app.screen(), &Screen::RoomList);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = BrowserApp::new(vec![room(1, "a"), room(2, "b")]);
        app.handle_event(&key(KeyCode::Char('k')));
        assert_eq!(app.list_state.selected(), Some(0));
        app.handle_event(&key(KeyCode::Char('j')));
        app.handle_event(&key(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn test_scroll_keys_and_percent() {
        let mut app = app_in_room(40);
        assert_eq!(app.scroll_percent(), 0.0);

        app.handle_event(&key(KeyCode::PageDown));
        assert!(app.scroll() > 0);

        app.handle_event(&key(KeyCode::End));
        assert_eq!(app.scroll_percent(), 100.0);
        let bottom = app.scroll();

        app.handle_event(&key(KeyCode::Down));
        assert_eq!(app.scroll(), bottom);

        app.handle_event(&key(KeyCode::Home));
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_short_transcript_reports_full_percent() {
        let app = app_in_room(1);
        assert_eq!(app.scroll_percent(), 100.0);
    }

    #[test]
    fn test_resize_clamps_scroll_without_changing_screen() {
        let mut app = app_in_room(40);
        app.handle_event(&key(KeyCode::End));
        let before = app.scroll();
        assert!(before > 0);

        app.handle_event(&Event::Resize(80, 200));

        assert!(matches!(app.screen(), Screen::ChatView { .. }));
        assert!(app.scroll() < before);
        assert_eq!(app.scroll(), app.transcript_len().saturating_sub(body_inner_size(80, 200).1));
    }

    #[test]
    fn test_mouse_wheel_scrolls_chat_view() {
        let mut app = app_in_room(40);
        app.handle_event(&wheel(MouseEventKind::ScrollDown));
        assert_eq!(app.scroll(), WHEEL_STEP);
        app.handle_event(&wheel(MouseEventKind::ScrollUp));
        assert_eq!(app.scroll(), 0);
        app.handle_event(&wheel(MouseEventKind::Down(MouseButton::Left)));
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_open_unknown_room_keeps_list() {
        let mut app = BrowserApp::new(vec![room(1, "general")]);
        app.open_room(99, Vec::new());
        assert_eq!(app.screen(), &Screen::RoomList);
        assert!(app.status().is_some());
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("hello world foo", 11), vec!["hello world", "foo"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("    indented code", 40), vec!["    indented code"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_uses_display_width() {
        // Each CJK character is two columns wide.
        assert_eq!(wrap_text("日本語テキスト", 6), vec!["日本語", "テキス", "ト"]);
    }
}
