//! Chat room management commands: list, create, show.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};

use palaver_core::room::RoomRepository;
use palaver_types::chat::MessageRole;
use palaver_types::room::ChatRoom;

use crate::cli::palette::Palette;
use crate::state::AppState;

/// List all rooms as a table, or as JSON with `--json`.
pub async fn list_rooms(state: &AppState, palette: &Palette, json: bool) -> Result<()> {
    let repo = state.open_rooms().await?;
    let rooms = repo.list_rooms().await.context("failed to list chat rooms")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rooms)?);
        return Ok(());
    }

    if rooms.is_empty() {
        println!();
        println!(
            "  {} No chat rooms found. Create one with: {}",
            palette.assistant("i"),
            palette.warning("palaver room create <name>")
        );
        println!();
        return Ok(());
    }

    let table = room_table(&rooms, palette.color_enabled());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} room{}",
        palette.bold(rooms.len()),
        if rooms.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Create a room and print its id.
pub async fn create_room(state: &AppState, palette: &Palette, name: &str, json: bool) -> Result<()> {
    let repo = state.open_rooms().await?;
    let room = repo
        .create_room(name)
        .await
        .with_context(|| format!("failed to create chat room '{name}'"))?;

    tracing::info!(room_id = room.id, name = %room.name, "Chat room created");

    if json {
        println!("{}", serde_json::to_string_pretty(&room)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created room {} {}",
        palette.success("✓"),
        palette.bold(&room.name),
        palette.dim(format!("(id {})", room.id))
    );
    println!(
        "  {}",
        palette.dim(format!("Chat in it with: palaver chat --room {}", room.id))
    );
    println!();
    Ok(())
}

/// Print a room's transcript.
pub async fn show_room(state: &AppState, palette: &Palette, room_id: i64, json: bool) -> Result<()> {
    let repo = state.open_rooms().await?;
    let room = repo
        .get_room(room_id)
        .await
        .context("failed to look up chat room")?
        .ok_or_else(|| anyhow::anyhow!("chat room {room_id} not found"))?;
    let messages = repo
        .list_messages(room_id)
        .await
        .context("failed to load room messages")?;

    if json {
        let body = serde_json::json!({ "room": room, "messages": messages });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let renderer = state.renderer(palette);
    println!();
    println!("  {}  {}", palette.assistant(&room.name), palette.dim(room.description()));
    println!("  {}", palette.dim("---"));

    if messages.is_empty() {
        println!("\n  {}\n", palette.dim("No messages in this room yet."));
        return Ok(());
    }

    for msg in &messages {
        let label = match msg.role {
            MessageRole::User => palette.user("You").to_string(),
            MessageRole::Assistant => palette.assistant("Assistant").to_string(),
            MessageRole::System => palette.dim("System").to_string(),
        };
        println!();
        println!(
            "{label}  {}",
            palette.dim(msg.created_at.format("%Y-%m-%d %H:%M:%S"))
        );
        println!("{}", renderer.render(&msg.content).trim_end());
    }
    println!();
    Ok(())
}

/// Table of rooms: id, name, creation time.
pub fn room_table(rooms: &[ChatRoom], color: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if !color {
        table.force_no_tty();
    }

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for room in rooms {
        table.add_row(vec![
            Cell::new(room.id).fg(Color::DarkGrey),
            Cell::new(&room.name).fg(Color::Cyan),
            Cell::new(room.created_at.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_room_table_lists_every_room() {
        let rooms = vec![
            ChatRoom {
                id: 1,
                name: "general".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            },
            ChatRoom {
                id: 2,
                name: "rust".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
            },
        ];

        let rendered = room_table(&rooms, false).to_string();

        assert!(rendered.contains("general"));
        assert!(rendered.contains("rust"));
        assert!(rendered.contains("2024-03-01 09:30:00"));
        assert!(!rendered.contains("\x1b["));
    }
}
