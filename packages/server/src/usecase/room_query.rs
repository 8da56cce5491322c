//! UseCase: ルーム情報の参照（HTTP API 用）

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, Member, MessageStore, RecordedMessage, RoomId};

use super::error::RoomQueryError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// メンバーが 1 人以上いるルームの一覧
    pub async fn execute(&self) -> Vec<(RoomId, Vec<Member>)> {
        self.registry.rooms().await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 空のルームは存在しないルームと同じく `RoomNotFound`
    pub async fn execute(&self, room_id: RoomId) -> Result<Vec<Member>, RoomQueryError> {
        let members = self.registry.members_of(&room_id).await;
        if members.is_empty() {
            return Err(RoomQueryError::RoomNotFound(room_id));
        }
        Ok(members)
    }
}

/// ルームの履歴取得のユースケース
pub struct GetRoomHistoryUseCase {
    message_store: Arc<dyn MessageStore>,
}

impl GetRoomHistoryUseCase {
    pub fn new(message_store: Arc<dyn MessageStore>) -> Self {
        Self { message_store }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<RecordedMessage>, RoomQueryError> {
        Ok(self.message_store.history(room_id).await?)
    }
}
