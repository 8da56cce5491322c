//! UseCase: 履歴の記録
//!
//! Broadcaster が配信したメッセージを 1 本のタスクで順番に MessageStore へ書き込む。
//! キューは有界で、投入はブロックしない。満杯の場合はそのメッセージの記録を諦め、
//! 配信には影響させない。

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{ChatMessage, MessageStore};

/// 記録タスクへの投入口
#[derive(Debug, Clone)]
pub struct MessageRecorder {
    queue: mpsc::Sender<ChatMessage>,
}

impl MessageRecorder {
    /// 記録タスクを起動する
    ///
    /// タスクは全ての投入口が破棄されると、残りを書き込んでから終了する。
    pub fn spawn(message_store: Arc<dyn MessageStore>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<ChatMessage>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = message_store
                    .record_message(
                        &message.room_id,
                        &message.from,
                        &message.text,
                        message.sent_at,
                    )
                    .await
                {
                    tracing::warn!("Failed to record message in '{}': {}", message.room_id, e);
                }
            }
        });
        Self { queue: tx }
    }

    /// 記録を依頼する（ブロックしない）
    pub fn record(&self, message: &ChatMessage) {
        match self.queue.try_send(message.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(
                    "Recorder queue is full, message in '{}' was not recorded",
                    message.room_id
                );
            }
            Err(TrySendError::Closed(message)) => {
                tracing::warn!(
                    "Recorder stopped, message in '{}' was not recorded",
                    message.room_id
                );
            }
        }
    }
}
