//! Conversion logic between DTOs and domain entities.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Member, PresenceSnapshot, RecordedMessage, RoomId};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&ChatMessage> for ws::WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            r#type: ws::MessageType::Chat,
            username: message.from.as_str().to_string(),
            text: Some(message.text.as_str().to_string()),
            room_id: Some(message.room_id.as_str().to_string()),
            active_members: None,
        }
    }
}

impl From<&PresenceSnapshot> for ws::WireMessage {
    fn from(snapshot: &PresenceSnapshot) -> Self {
        Self {
            r#type: ws::MessageType::ActiveMembers,
            username: String::new(),
            text: None,
            room_id: Some(snapshot.room_id.as_str().to_string()),
            active_members: Some(
                snapshot
                    .members
                    .iter()
                    .map(|name| name.as_str().to_string())
                    .collect(),
            ),
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Member> for http::MemberDetailDto {
    fn from(member: &Member) -> Self {
        Self {
            username: member.display_name.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(member.connected_at.value()),
        }
    }
}

impl From<RecordedMessage> for http::HistoryEntryDto {
    fn from(message: RecordedMessage) -> Self {
        Self {
            username: message.username.into_string(),
            text: message.text.into_string(),
            sent_at: timestamp_to_rfc3339(message.sent_at.value()),
        }
    }
}

impl From<(RoomId, Vec<Member>)> for http::RoomSummaryDto {
    fn from((room_id, members): (RoomId, Vec<Member>)) -> Self {
        Self {
            id: room_id.into_string(),
            members: members
                .into_iter()
                .map(|m| m.display_name.into_string())
                .collect(),
        }
    }
}

impl From<(RoomId, Vec<Member>)> for http::RoomDetailDto {
    fn from((room_id, members): (RoomId, Vec<Member>)) -> Self {
        Self {
            id: room_id.into_string(),
            members: members.iter().map(http::MemberDetailDto::from).collect(),
        }
    }
}
