//! HistoryStore trait definition.
//!
//! A history store owns the on-disk copy of the conversation. Loading never
//! fails the caller: an unreadable store degrades to an empty history.
//! Implementations live in palaver-infra (`JsonHistoryStore`,
//! `RoomHistoryStore`).

use palaver_types::chat::ChatHistory;
use palaver_types::error::HistoryError;

/// Persistence port for the REPL's conversation history.
pub trait HistoryStore: Send + Sync {
    /// Short label for banners and logs (a file path or room name).
    fn describe(&self) -> String;

    /// Load the stored history, or an empty one if nothing usable exists.
    fn load(&mut self) -> impl std::future::Future<Output = ChatHistory> + Send;

    /// Persist the full history. On error the previous stored state is kept.
    fn save(
        &mut self,
        history: &ChatHistory,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;
}
