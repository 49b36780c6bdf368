//! Configuration loading for Palaver.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`ChatConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use palaver_types::config::ChatConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PALAVER_DATA_DIR";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ChatConfig::default()`].
/// - Unreadable or unparsable file: a warning and the default.
pub async fn load_config(data_dir: &Path) -> ChatConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", config_path.display());
            ChatConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `PALAVER_DATA_DIR` environment variable
/// 2. `~/.palaver`
/// 3. `.palaver` in the working directory
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn data_dir_from(env_value: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_value.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    match home {
        Some(home) => home.join(".palaver"),
        None => PathBuf::from(".palaver"),
    }
}

/// Path of the log file used while the full-screen UI owns the terminal.
pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("palaver.log")
}
