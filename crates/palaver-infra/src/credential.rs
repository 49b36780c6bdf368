//! API credential resolution.
//!
//! The credential comes from the process environment, optionally seeded from
//! a `.env` file. A malformed `.env` is an error; a missing one only matters
//! if the variable is not already set.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::debug;

use palaver_types::error::ConfigError;

/// Outcome of looking for a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
}

/// Load `.env` from the current directory or its ancestors.
pub fn load_dotenv() -> Result<EnvFile, ConfigError> {
    classify(dotenvy::dotenv())
}

/// Load a specific `.env` file.
pub fn load_dotenv_from(path: &Path) -> Result<EnvFile, ConfigError> {
    classify(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn classify(result: Result<PathBuf, dotenvy::Error>) -> Result<EnvFile, ConfigError> {
    match result {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Ok(EnvFile::Loaded(path))
        }
        Err(e) if e.not_found() => {
            debug!("No .env file found");
            Ok(EnvFile::Missing)
        }
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

/// Read the API key from the process environment.
pub fn resolve_api_key(var: &str) -> Result<SecretString, ConfigError> {
    api_key_from(var, |name| std::env::var(name).ok())
}

/// Read the API key through `lookup`. Absent and blank values are errors.
pub fn api_key_from<F>(var: &str, lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
        _ => Err(ConfigError::MissingCredential {
            var: var.to_string(),
        }),
    }
}
