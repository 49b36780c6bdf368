//! JSON flat-file history store.
//!
//! The whole conversation lives in one file as
//! `{"messages": [{"role", "content", "time"}, ...]}`, pretty-printed with
//! two-space indentation. Writes go to a temp file in the same directory and
//! are renamed over the target, so a failed save never truncates the
//! previous file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use palaver_core::history::HistoryStore;
use palaver_types::chat::ChatHistory;
use palaver_types::error::HistoryError;

/// Default file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";

/// `HistoryStore` backed by a single JSON file.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&mut self) -> ChatHistory {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No existing chat history found, starting fresh");
                return ChatHistory::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read chat history, starting fresh");
                return ChatHistory::new();
            }
        };

        match serde_json::from_str::<ChatHistory>(&raw) {
            Ok(history) => {
                info!(
                    path = %self.path.display(),
                    messages = history.len(),
                    "Successfully loaded chat history"
                );
                history
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Chat history is malformed, starting fresh");
                ChatHistory::new()
            }
        }
    }

    async fn save(&mut self, history: &ChatHistory) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(history)
            .map_err(|e| HistoryError::Serialize(e.to_string()))?;

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
            .await
            .map_err(|e| HistoryError::Io(e.to_string()))
            .and_then(|r| r.map_err(|e| HistoryError::Io(e.to_string())));

        if let Err(ref e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to save chat history");
        }
        result
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
