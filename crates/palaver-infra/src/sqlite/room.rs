//! `RoomRepository` on SQLite.
//!
//! Timestamps are stored as RFC 3339 text with fixed nanosecond precision,
//! so lexical order on `created_at` is chronological order. Roles are stored
//! by their lowercase name.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use palaver_core::room::RoomRepository;
use palaver_types::error::RepositoryError;
use palaver_types::llm::MessageRole;
use palaver_types::room::{ChatRoom, RoomMessage};

use super::pool::DatabasePool;

const SQLITE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const ROOM_COLUMNS: &str = "SELECT id, name, created_at FROM chat_rooms";

#[derive(Clone)]
pub struct SqliteRoomRepository {
    pool: DatabasePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRecord {
    id: i64,
    name: String,
    created_at: String,
}

impl TryFrom<RoomRecord> for ChatRoom {
    type Error = RepositoryError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        Ok(ChatRoom {
            id: record.id,
            name: record.name,
            created_at: decode_time(&record.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRecord {
    id: i64,
    chat_room_id: i64,
    role: String,
    content: String,
    created_at: String,
}

impl TryFrom<MessageRecord> for RoomMessage {
    type Error = RepositoryError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(RoomMessage {
            id: record.id,
            chat_room_id: record.chat_room_id,
            role: record.role.parse().map_err(RepositoryError::Query)?,
            content: record.content,
            created_at: decode_time(&record.created_at)?,
        })
    }
}

/// RFC 3339, or SQLite's own `CURRENT_TIMESTAMP` form read as UTC.
fn decode_time(text: &str) -> Result<DateTime<Utc>, RepositoryError> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, SQLITE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Query(format!("invalid timestamp '{text}': {e}")))
}

fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn query_failed(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(err.to_string())
}

fn convert_all<R, T>(records: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    records.into_iter().map(T::try_from).collect()
}

impl RoomRepository for SqliteRoomRepository {
    async fn list_rooms(&self) -> Result<Vec<ChatRoom>, RepositoryError> {
        let records: Vec<RoomRecord> = sqlx::query_as(&format!("{ROOM_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_failed)?;
        convert_all(records)
    }

    async fn get_room(&self, room_id: i64) -> Result<Option<ChatRoom>, RepositoryError> {
        let record: Option<RoomRecord> = sqlx::query_as(&format!("{ROOM_COLUMNS} WHERE id = ?"))
            .bind(room_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_failed)?;
        record.map(ChatRoom::try_from).transpose()
    }

    async fn create_room(&self, name: &str) -> Result<ChatRoom, RepositoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::Conflict("room name must not be empty".to_string()));
        }

        let created_at = Utc::now();
        let id = sqlx::query("INSERT INTO chat_rooms (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(encode_time(&created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(query_failed)?
            .last_insert_rowid();

        tracing::debug!(room_id = id, name, "Created chat room");
        Ok(ChatRoom {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    async fn list_messages(&self, room_id: i64) -> Result<Vec<RoomMessage>, RepositoryError> {
        let records: Vec<MessageRecord> = sqlx::query_as(
            "SELECT id, chat_room_id, role, content, created_at FROM messages \
             WHERE chat_room_id = ? ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_failed)?;
        convert_all(records)
    }

    async fn append_message(
        &self,
        room_id: i64,
        role: MessageRole,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RoomMessage, RepositoryError> {
        let inserted = sqlx::query(
            "INSERT INTO messages (chat_room_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(room_id)
        .bind(role.as_str())
        .bind(content)
        .bind(encode_time(&created_at))
        .execute(&self.pool.writer)
        .await;

        let id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                return Err(RepositoryError::NotFound);
            }
            Err(e) => return Err(query_failed(e)),
        };

        Ok(RoomMessage {
            id,
            chat_room_id: room_id,
            role,
            content: content.to_string(),
            created_at,
        })
    }
}
