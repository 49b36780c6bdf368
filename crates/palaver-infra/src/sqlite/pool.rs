//! Connection pools for the rooms database.
//!
//! SQLite takes one writer at a time, so writes go through a single-connection
//! pool while reads share a small read-only pool. WAL lets readers proceed
//! while the writer holds its lock. Foreign keys are on so that deleting a
//! room removes its messages.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READ_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database at `path`, creating the file if needed, and bring
    /// the schema up to date before any reader connects.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;
        upgrade_legacy_messages(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READ_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(path = %path.display(), "Opened rooms database");
        Ok(Self { reader, writer })
    }
}

/// Databases written by the earlier Go client have `messages(id,
/// chat_room_id, message, created_at)`: the text column is called `message`
/// and there is no `role`. `CREATE TABLE IF NOT EXISTS` leaves such a table
/// alone, so bring it to the current shape here. Old rows read as `user`.
async fn upgrade_legacy_messages(writer: &SqlitePool) -> Result<(), sqlx::Error> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('messages')")
            .fetch_all(writer)
            .await?;
    let has = |name: &str| columns.iter().any(|c| c == name);

    if !has("content") && has("message") {
        sqlx::query("ALTER TABLE messages RENAME COLUMN message TO content")
            .execute(writer)
            .await?;
        tracing::info!("Renamed legacy messages.message column to content");
    }
    if !has("role") {
        sqlx::query("ALTER TABLE messages ADD COLUMN role TEXT NOT NULL DEFAULT 'user'")
            .execute(writer)
            .await?;
        tracing::info!("Added role column to legacy messages table");
    }
    Ok(())
}
