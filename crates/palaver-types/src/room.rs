//! Chat room types for the database-backed conversation store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::llm::MessageRole;

/// A named container for one conversation's messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Secondary line shown under the room name in the browser.
    pub fn description(&self) -> String {
        format!("Created at: {}", self.created_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// A persisted message row belonging to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessage {
    pub id: i64,
    pub chat_room_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&RoomMessage> for ChatMessage {
    fn from(msg: &RoomMessage) -> Self {
        ChatMessage {
            role: msg.role,
            content: msg.content.clone(),
            time: msg.created_at,
        }
    }
}
