//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの有界 `Sender` を管理
//! - フレームを送信キューへ投入（`try_send`、ブロックしない）
//!
//! ## 設計ノート
//!
//! WebSocket への実際の書き込みは UI 層の writer タスクが行う。
//! キューが満杯（遅いクライアント）またはクローズ済み（writer 終了）の場合は
//! 配信失敗として呼び出し側に返し、呼び出し側が退去処理を行う。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{ConnectionId, DeliveryFailure, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket writer タスクへフレームを渡す MessagePusher 実装
#[derive(Debug, Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中のクライアント数
    pub async fn count_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

fn try_push(
    connection_id: ConnectionId,
    sender: &PusherChannel,
    content: &str,
) -> Result<(), MessagePushError> {
    sender
        .try_send(content.to_string())
        .map_err(|e| match e {
            TrySendError::Full(_) => MessagePushError::ChannelFull(connection_id),
            TrySendError::Closed(_) => MessagePushError::ChannelClosed(connection_id),
        })
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        let sender = clients
            .get(connection_id)
            .ok_or(MessagePushError::ClientNotFound(*connection_id))?;
        try_push(*connection_id, sender, content)?;
        tracing::debug!("Pushed message to client '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(&self, targets: &[ConnectionId], content: &str) -> Vec<DeliveryFailure> {
        let clients = self.clients.lock().await;
        let mut failures = Vec::new();

        for target in targets {
            let Some(sender) = clients.get(target) else {
                // leave と配信が競合した場合。退去済みなので失敗扱いしない
                tracing::debug!("Client '{}' not found during broadcast, skipping", target);
                continue;
            };
            match try_push(*target, sender, content) {
                Ok(()) => tracing::debug!("Broadcasted message to client '{}'", target),
                Err(error) => {
                    tracing::warn!("Failed to push message to client '{}': {}", target, error);
                    failures.push(DeliveryFailure {
                        connection_id: *target,
                        error,
                    });
                }
            }
        }

        failures
    }
}
