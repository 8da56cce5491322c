//! Value objects.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Room used when the client does not name one.
pub const DEFAULT_ROOM_ID: &str = "default";

const ROOM_ID_MAX_LEN: usize = 64;
const DISPLAY_NAME_MAX_LEN: usize = 32;
const MESSAGE_TEXT_MAX_LEN: usize = 4096;

/// Opaque identity of one live connection.
///
/// Generated server-side on every upgrade, so a reconnecting client always
/// gets a fresh identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Factory for fresh connection ids.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4())
    }
}

/// Room identifier, supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        if trimmed.chars().count() > ROOM_ID_MAX_LEN {
            return Err(ValueObjectError::RoomIdTooLong(ROOM_ID_MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The well-known room clients land in when they name none.
    pub fn default_room() -> Self {
        Self(DEFAULT_ROOM_ID.to_string())
    }

    /// Resolve an optional client-supplied room id.
    ///
    /// Missing or blank values map to [`RoomId::default_room`].
    pub fn from_param(param: Option<&str>) -> Result<Self, ValueObjectError> {
        match param.map(str::trim) {
            None | Some("") => Ok(Self::default_room()),
            Some(id) => Self::new(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Name shown to the other members of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(ValueObjectError::DisplayNameTooLong(DISPLAY_NAME_MAX_LEN));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValueObjectError::DisplayNameInvalid);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Whether `name` is acceptable as an account name (ASCII letters,
    /// digits and underscores only).
    pub fn is_account_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= DISPLAY_NAME_MAX_LEN
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat payload. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.trim().is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        if text.chars().count() > MESSAGE_TEXT_MAX_LEN {
            return Err(ValueObjectError::MessageTextTooLong(MESSAGE_TEXT_MAX_LEN));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_from_missing_param_is_default() {
        // テスト項目: room_id が未指定・空文字の場合は "default" になる
        // given (前提条件):
        let missing: Option<&str> = None;
        let blank = Some("   ");

        // when (操作):
        let from_missing = RoomId::from_param(missing).unwrap();
        let from_blank = RoomId::from_param(blank).unwrap();

        // then (期待する結果):
        assert_eq!(from_missing.as_str(), DEFAULT_ROOM_ID);
        assert_eq!(from_blank, RoomId::default_room());
    }

    #[test]
    fn test_room_id_is_trimmed() {
        // テスト項目: room_id の前後の空白は除去される
        // given (前提条件):
        let raw = Some("  lobby ");

        // when (操作):
        let room_id = RoomId::from_param(raw).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "lobby");
    }

    #[test]
    fn test_room_id_too_long_is_rejected() {
        // テスト項目: 長すぎる room_id はエラーになる
        // given (前提条件):
        let raw = "r".repeat(ROOM_ID_MAX_LEN + 1);

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::RoomIdTooLong(ROOM_ID_MAX_LEN)));
    }

    #[test]
    fn test_display_name_validation() {
        // テスト項目: 表示名の空文字・制御文字・長さ超過が拒否される
        // given (前提条件):
        let long = "a".repeat(DISPLAY_NAME_MAX_LEN + 1);

        // when (操作) / then (期待する結果):
        assert_eq!(
            DisplayName::new("".to_string()),
            Err(ValueObjectError::DisplayNameEmpty)
        );
        assert_eq!(
            DisplayName::new("bad\nname".to_string()),
            Err(ValueObjectError::DisplayNameInvalid)
        );
        assert_eq!(
            DisplayName::new(long),
            Err(ValueObjectError::DisplayNameTooLong(DISPLAY_NAME_MAX_LEN))
        );
        assert_eq!(DisplayName::new(" alice ".to_string()).unwrap().as_str(), "alice");
    }

    #[test]
    fn test_is_account_name() {
        // テスト項目: アカウント名は英数字とアンダースコアのみ許可される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(DisplayName::is_account_name("alice_01"));
        assert!(!DisplayName::is_account_name(""));
        assert!(!DisplayName::is_account_name("alice bob"));
        assert!(!DisplayName::is_account_name("アリス"));
    }

    #[test]
    fn test_message_text_rejects_blank() {
        // テスト項目: 空白のみのメッセージは拒否される
        // given (前提条件):
        let blank = "  \t ".to_string();

        // when (操作):
        let result = MessageText::new(blank);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MessageTextEmpty));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 生成される ConnectionId は一意である
        // given (前提条件) / when (操作):
        let a = ConnectionIdFactory::generate();
        let b = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }
}
