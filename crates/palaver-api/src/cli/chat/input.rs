//! Line input for the REPL.
//!
//! `InputSource` is what the loop reads from; `ChatInput` implements it over
//! `rustyline_async::Readline` with EOF (Ctrl+D) and interrupt (Ctrl+C)
//! handling.

use std::future::Future;

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// Events produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A submitted line, trimmed.
    Message(String),
    /// End of input (Ctrl+D).
    Eof,
    /// Interrupt (Ctrl+C).
    Interrupted,
}

pub trait InputSource {
    fn read_line(&mut self) -> impl Future<Output = InputEvent>;

    /// Clear the screen, where the source owns one.
    fn clear(&mut self) {}
}

/// Readline-backed input with in-memory line history.
pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Returns the input handle and a `SharedWriter` that prints without
    /// disturbing the prompt.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }
}

impl InputSource for ChatInput {
    async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    self.rl.add_history_entry(trimmed.clone());
                }
                InputEvent::Message(trimmed)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input, ending session");
                InputEvent::Eof
            }
        }
    }

    fn clear(&mut self) {
        let _ = self.rl.clear();
    }
}
