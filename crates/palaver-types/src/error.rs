use thiserror::Error;

/// Errors from repository operations (used by trait definitions in palaver-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from persisting conversation history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to serialize history: {0}")]
    Serialize(String),

    #[error("failed to write history file: {0}")]
    Io(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors resolving configuration and credentials at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not set in the environment")]
    MissingCredential { var: String },

    #[error("failed to load .env file: {0}")]
    EnvFile(String),
}
