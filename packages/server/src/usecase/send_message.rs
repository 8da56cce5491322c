//! UseCase: メッセージ送信処理
//!
//! 送信者のセッションがまだ登録されていることを確認し、
//! 送信者の表示名とルームを付けて Broadcaster のキューへ入れる。
//! クライアントが送ってきた username / room_id は使わない。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{ChatMessage, ConnectionId, ConnectionRegistry, MessageText, Timestamp};

use super::{broadcaster::BroadcastHandle, error::SendMessageError};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    broadcast: BroadcastHandle,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        broadcast: BroadcastHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            broadcast,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - キューに入れたメッセージ
    /// * `Err(SendMessageError::NotJoined)` - セッションが既に退去済み
    /// * `Err(SendMessageError::QueueClosed)` - Broadcaster が停止済み
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        text: MessageText,
    ) -> Result<ChatMessage, SendMessageError> {
        let member = self
            .registry
            .member(connection_id)
            .await
            .map_err(|_| SendMessageError::NotJoined(*connection_id))?;

        let message = ChatMessage {
            sender: member.id,
            from: member.display_name,
            room_id: member.room_id,
            text,
            sent_at: Timestamp::new(self.clock.now_millis()),
        };
        self.broadcast.submit(message.clone()).await?;

        Ok(message)
    }
}
