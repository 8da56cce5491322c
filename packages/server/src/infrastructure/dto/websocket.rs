//! WebSocket frame DTOs.
//!
//! Every frame is one JSON object:
//!
//! ```text
//! { "type": "chat" | "active-members" | "error",
//!   "username": "...", "text": "...", "room_id": "...",
//!   "active_members": ["..."] }
//! ```

use serde::{Deserialize, Serialize};

/// Frame type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    #[default]
    Chat,
    ActiveMembers,
    Error,
}

/// The single wire message shape, inbound and outbound.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub r#type: MessageType,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_members: Option<Vec<String>>,
}

impl WireMessage {
    /// Error frame sent right before the server closes a connection.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Join parameters, taken from the upgrade query string or, when the query
/// carries no username, from the first frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct JoinParams {
    pub room_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl JoinParams {
    pub fn has_username(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}
