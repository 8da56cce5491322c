//! UseCase: 参加者切断処理
//!
//! Registry から削除し、送信キューを登録解除して、
//! 元のルームに残ったメンバーへプレゼンスを再送する。
//! 既に削除済み（退去済み）の接続に対しては何もしない。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, RoomId};

use super::{error::DisconnectError, presence::PresenceNotifier};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceNotifier>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceNotifier>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 退出したルーム
    /// * `Err(DisconnectError::NotFound)` - 登録されていない（2 回目の呼び出しなど）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<RoomId, DisconnectError> {
        let room_id = self
            .registry
            .leave(connection_id)
            .await
            .map_err(|_| DisconnectError::NotFound(*connection_id))?;

        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!("Connection '{}' left room '{}'", connection_id, room_id);

        self.presence.notify(&room_id).await;

        Ok(room_id)
    }
}
