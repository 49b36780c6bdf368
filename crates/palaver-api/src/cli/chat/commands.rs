//! Slash commands available inside the REPL.
//!
//! Anything starting with `/` is a command and never reaches the model.

use crate::cli::palette::Palette;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Leave the REPL.
    Exit,
    /// Show the most recent messages.
    History,
    Unknown(String),
}

/// Parse `input` as a slash command, or `None` if it is a prompt.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        _ => Some(ChatCommand::Unknown(cmd)),
    }
}

pub fn print_help(palette: &Palette) {
    println!();
    println!("  {}", palette.bold("Available commands:"));
    println!();
    println!("  {}     {}", palette.assistant("/help"), "Show this help message");
    println!("  {}    {}", palette.assistant("/clear"), "Clear the screen");
    println!("  {}     {}", palette.assistant("/exit"), "End the chat session");
    println!("  {}  {}", palette.assistant("/history"), "Show recent messages");
    println!();
    println!(
        "  {}",
        palette.dim("Typing 'exit' also quits. Ctrl+D to exit, Ctrl+C is safe.")
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/Q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_clear_and_history() {
        assert_eq!(parse("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse("/cls"), Some(ChatCommand::Clear));
        assert_eq!(parse("  /history  "), Some(ChatCommand::History));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("exit"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse("/foo bar"),
            Some(ChatCommand::Unknown("/foo".to_string()))
        );
    }
}
