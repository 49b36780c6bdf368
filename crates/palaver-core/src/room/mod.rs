//! RoomRepository trait definition.
//!
//! Chat rooms and their messages live in the embedded database. Implementations
//! live in palaver-infra (`SqliteRoomRepository`).

use palaver_types::error::RepositoryError;
use palaver_types::llm::MessageRole;
use palaver_types::room::{ChatRoom, RoomMessage};

/// Repository trait for chat room and room message persistence.
pub trait RoomRepository: Send + Sync {
    /// All rooms, oldest first.
    fn list_rooms(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatRoom>, RepositoryError>> + Send;

    fn get_room(
        &self,
        room_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatRoom>, RepositoryError>> + Send;

    /// Create a room and return it with its assigned id.
    fn create_room(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<ChatRoom, RepositoryError>> + Send;

    /// Messages of a room in chronological order.
    fn list_messages(
        &self,
        room_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<RoomMessage>, RepositoryError>> + Send;

    /// Append one message to a room.
    fn append_message(
        &self,
        room_id: i64,
        role: MessageRole,
        content: &str,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> impl std::future::Future<Output = Result<RoomMessage, RepositoryError>> + Send;
}
