//! Message store trait.

use async_trait::async_trait;

use super::{DisplayName, MessageText, PersistenceError, RecordedMessage, RoomId, Timestamp};

/// Best-effort chat history.
///
/// Called by the broadcaster off the delivery path; an error here is logged
/// and never affects delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn record_message(
        &self,
        room_id: &RoomId,
        username: &DisplayName,
        text: &MessageText,
        sent_at: Timestamp,
    ) -> Result<(), PersistenceError>;

    /// Recorded messages of a room, oldest first.
    async fn history(&self, room_id: &RoomId) -> Result<Vec<RecordedMessage>, PersistenceError>;
}
