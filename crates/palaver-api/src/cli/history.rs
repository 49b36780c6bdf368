//! `palaver history`: print the saved JSON history.

use anyhow::Result;

use palaver_core::history::HistoryStore;
use palaver_types::chat::{ChatHistory, MessageRole};

use crate::cli::chat::assistant_label;
use crate::cli::palette::Palette;
use crate::state::AppState;

pub async fn show_history(state: &AppState, palette: &Palette, limit: usize, json: bool) -> Result<()> {
    let mut store = state.history_store();
    let history = store.load().await;
    let recent = recent(&history, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    if recent.is_empty() {
        println!();
        println!(
            "  {} No saved messages in {}",
            palette.assistant("i"),
            palette.dim(store.describe())
        );
        println!();
        return Ok(());
    }

    let renderer = state.renderer(palette);
    let assistant = assistant_label(state.config.provider);

    println!();
    println!(
        "  {} {}",
        palette.bold(format!("Last {} of {} messages", recent.len(), history.len())),
        palette.dim(format!("({})", store.describe()))
    );
    for msg in &recent.messages {
        let label = match msg.role {
            MessageRole::User => palette.user("You:").to_string(),
            MessageRole::Assistant => palette.assistant(format!("{assistant}:")).to_string(),
            MessageRole::System => palette.dim("System:").to_string(),
        };
        println!();
        println!("{label} {}", palette.dim(msg.time.format("%Y-%m-%d %H:%M:%S")));
        println!("{}", renderer.render(&msg.content).trim_end());
    }
    println!();
    Ok(())
}

/// The last `limit` messages as a history of their own.
fn recent(history: &ChatHistory, limit: usize) -> ChatHistory {
    ChatHistory {
        messages: history.tail(limit).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_keeps_newest_in_order() {
        let mut history = ChatHistory::new();
        for i in 0..5 {
            history.add(MessageRole::User, format!("m{i}"));
        }

        let tail = recent(&history, 2);
        let contents: Vec<&str> = tail.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4"]);

        assert_eq!(recent(&history, 50).len(), 5);
        assert!(recent(&history, 0).is_empty());
    }
}
