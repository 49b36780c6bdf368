//! History store backed by a database chat room.
//!
//! `load` reads the room's messages in chronological order. `save` appends
//! only the messages added since the last successful load/save, so the room
//! stays append-only.

use tracing::{info, warn};

use palaver_core::history::HistoryStore;
use palaver_core::room::RoomRepository;
use palaver_types::chat::{ChatHistory, ChatMessage};
use palaver_types::error::HistoryError;
use palaver_types::room::ChatRoom;

/// `HistoryStore` that reads and appends to one room.
pub struct RoomHistoryStore<R: RoomRepository> {
    repo: R,
    room: ChatRoom,
    persisted: usize,
}

impl<R: RoomRepository> RoomHistoryStore<R> {
    pub fn new(repo: R, room: ChatRoom) -> Self {
        Self {
            repo,
            room,
            persisted: 0,
        }
    }

    pub fn room(&self) -> &ChatRoom {
        &self.room
    }
}

impl<R: RoomRepository> HistoryStore for RoomHistoryStore<R> {
    fn describe(&self) -> String {
        format!("room #{} ({})", self.room.id, self.room.name)
    }

    async fn load(&mut self) -> ChatHistory {
        match self.repo.list_messages(self.room.id).await {
            Ok(rows) => {
                let history = ChatHistory {
                    messages: rows.iter().map(ChatMessage::from).collect(),
                };
                self.persisted = history.len();
                info!(
                    room_id = self.room.id,
                    messages = history.len(),
                    "Successfully loaded room history"
                );
                history
            }
            Err(e) => {
                warn!(room_id = self.room.id, error = %e, "Failed to load room history, starting fresh");
                self.persisted = 0;
                ChatHistory::new()
            }
        }
    }

    async fn save(&mut self, history: &ChatHistory) -> Result<(), HistoryError> {
        let pending = history.messages.get(self.persisted..).unwrap_or_default();

        for message in pending {
            if let Err(e) = self
                .repo
                .append_message(self.room.id, message.role, &message.content, message.time)
                .await
            {
                warn!(room_id = self.room.id, error = %e, "Failed to save room message");
                return Err(e.into());
            }
            self.persisted += 1;
        }

        Ok(())
    }
}
