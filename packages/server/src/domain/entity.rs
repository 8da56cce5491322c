//! Entities and transient events.

use super::value_object::{ConnectionId, DisplayName, MessageText, RoomId, Timestamp};

/// Session metadata of one registered connection.
///
/// A member belongs to exactly one room for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: ConnectionId,
    pub display_name: DisplayName,
    pub room_id: RoomId,
    pub connected_at: Timestamp,
}

impl Member {
    pub fn new(
        id: ConnectionId,
        display_name: DisplayName,
        room_id: RoomId,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            display_name,
            room_id,
            connected_at,
        }
    }
}

/// Chat message on its way through the broadcaster. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: ConnectionId,
    pub from: DisplayName,
    pub room_id: RoomId,
    pub text: MessageText,
    pub sent_at: Timestamp,
}

/// Who is in a room right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub room_id: RoomId,
    /// Display names in join order.
    pub members: Vec<DisplayName>,
}

impl PresenceSnapshot {
    pub fn from_members(room_id: RoomId, members: &[Member]) -> Self {
        Self {
            room_id,
            members: members.iter().map(|m| m.display_name.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One entry of a room's recorded history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub username: DisplayName,
    pub text: MessageText,
    pub sent_at: Timestamp,
}
