//! Room browser rendering.
//!
//! Layout: a bordered title header, the body (room list or transcript) and
//! a footer with key hints, scroll position and status.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::app::{BrowserApp, Screen};

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;

/// Inner (borderless) size of the body for a terminal of the given size.
pub fn body_inner_size(width: u16, height: u16) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + 2);
    (usize::from(inner_width), usize::from(inner_height))
}

pub fn draw(frame: &mut Frame, app: &mut BrowserApp) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    draw_header(frame, layout[0], app);
    match app.screen() {
        Screen::RoomList => draw_room_list(frame, layout[1], app),
        Screen::ChatView { .. } => draw_chat_view(frame, layout[1], app),
    }
    draw_footer(frame, layout[2], app);
}

fn bordered() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn draw_header(frame: &mut Frame, area: Rect, app: &BrowserApp) {
    let title = match app.screen() {
        Screen::RoomList => format!(" Palaver  |  Chat Rooms ({}) ", app.rooms().len()),
        Screen::ChatView { room } => format!(
            " Palaver  |  {}  |  {} messages ",
            room.name,
            app.messages().len()
        ),
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(bordered());
    frame.render_widget(header, area);
}

fn draw_room_list(frame: &mut Frame, area: Rect, app: &mut BrowserApp) {
    if app.rooms().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No chat rooms yet."),
            Line::from(Span::styled(
                "Create one with: palaver room create <name>",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(bordered().title(" Rooms "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .rooms()
        .iter()
        .map(|room| {
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(
                    room.name.clone(),
                    Style::default().fg(Color::White).bold(),
                )),
                Line::from(Span::styled(
                    room.description(),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(bordered().title(" Rooms "))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_chat_view(frame: &mut Frame, area: Rect, app: &BrowserApp) {
    let body = Paragraph::new(app.visible_lines()).block(bordered());
    frame.render_widget(body, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &BrowserApp) {
    let hints = match app.screen() {
        Screen::RoomList => " j/k move  Enter open  q quit ".to_string(),
        Screen::ChatView { .. } => format!(
            " j/k scroll  PgUp/PgDn page  Esc back  q quit  {:3.0}% ",
            app.scroll_percent()
        ),
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::Gray))];
    if let Some(status) = app.status() {
        spans.push(Span::styled(
            format!(" {status} "),
            Style::default().fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(bordered());
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use ratatui::backend::TestBackend;

    use palaver_types::room::ChatRoom;

    fn rendered(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_body_inner_size() {
        assert_eq!(body_inner_size(80, 24), (78, 16));
        assert_eq!(body_inner_size(1, 1), (0, 0));
    }

    #[test]
    fn test_draw_room_list() {
        let mut app = BrowserApp::new(vec![ChatRoom {
            id: 1,
            name: "general".to_string(),
            created_at: Utc::now(),
        }]);
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let screen = rendered(&terminal);
        assert!(screen.contains("Chat Rooms (1)"));
        assert!(screen.contains("> general"));
        assert!(screen.contains("Created at:"));
    }

    #[test]
    fn test_draw_empty_room_list_shows_hint() {
        let mut app = BrowserApp::new(Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        assert!(rendered(&terminal).contains("No chat rooms yet."));
    }
}
