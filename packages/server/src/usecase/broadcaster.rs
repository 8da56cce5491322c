//! UseCase: ブロードキャスト
//!
//! Inbound Reader から受け取ったチャットメッセージを 1 本のキューで直列化し、
//! 宛先ルームの全メンバー（送信者本人を含む）へ配信する。
//!
//! ## 順序
//!
//! 消費者は 1 タスクだけなので、同じルーム宛てのメッセージは
//! キューに入った順に全メンバーへ届く（ルーム単位 FIFO）。
//!
//! ## バックプレッシャー
//!
//! キューは有界。満杯の場合、送信側（Inbound Reader）は空きが出るまで待つ。
//!
//! ## 配信失敗
//!
//! 書き込みに失敗したメンバーだけを Registry 経由で退去させ、
//! 他のメンバーへの配信は続ける。退去があった場合はプレゼンスを 1 回だけ再送する。
//!
//! ## プレゼンスとの順序
//!
//! 宛先の解決と配信は PresenceNotifier の gate の下で行う。join 中の参加者に、
//! 自分の join を反映したプレゼンスより先にチャットが届くことはない。

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ChatMessage, ConnectionRegistry, MessagePusher},
    infrastructure::dto::websocket::WireMessage,
};

use super::{error::SendMessageError, presence::PresenceNotifier, recorder::MessageRecorder};

/// Broadcaster キューへの投入口（clone して各 Inbound Reader が保持する）
#[derive(Debug, Clone)]
pub struct BroadcastHandle {
    queue: mpsc::Sender<ChatMessage>,
}

impl BroadcastHandle {
    /// メッセージをキューへ入れる。満杯なら空きが出るまで待つ
    pub async fn submit(&self, message: ChatMessage) -> Result<(), SendMessageError> {
        self.queue
            .send(message)
            .await
            .map_err(|_| SendMessageError::QueueClosed)
    }
}

/// 1 メッセージ分の配信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// チャットメッセージの単一の直列消費者
pub struct Broadcaster {
    queue: mpsc::Receiver<ChatMessage>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceNotifier>,
    recorder: Option<MessageRecorder>,
}

impl Broadcaster {
    /// Broadcaster と、そのキューへの投入口を作成
    ///
    /// # Arguments
    ///
    /// * `capacity` - キューの容量（1 以上）
    pub fn new(
        capacity: usize,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceNotifier>,
        recorder: Option<MessageRecorder>,
    ) -> (Self, BroadcastHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let broadcaster = Self {
            queue: rx,
            registry,
            message_pusher,
            presence,
            recorder,
        };
        (broadcaster, BroadcastHandle { queue: tx })
    }

    /// 全ての投入口が破棄されるまでキューを消費する
    pub async fn run(mut self) {
        tracing::info!("Broadcaster started");
        while let Some(message) = self.queue.recv().await {
            self.deliver(message).await;
        }
        tracing::info!("Broadcaster stopped");
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// 1 メッセージをルームの全メンバーへ配信する
    pub async fn deliver(&self, message: ChatMessage) -> DeliveryReport {
        if let Some(recorder) = &self.recorder {
            recorder.record(&message);
        }

        let frame = match WireMessage::from(&message).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode chat message: {}", e);
                return DeliveryReport::default();
            }
        };

        // ロック内でコピーしたスナップショットに対して配信する
        let gate = self.presence.sequence().await;
        let targets: Vec<_> = self
            .registry
            .members_of(&message.room_id)
            .await
            .into_iter()
            .map(|m| m.id)
            .collect();
        let failures = self.message_pusher.broadcast(&targets, &frame).await;
        drop(gate);
        let delivered = targets.len() - failures.len();
        tracing::debug!(
            "Delivered chat from '{}' in '{}' to {} member(s)",
            message.from,
            message.room_id,
            delivered
        );

        let evicted = self.presence.evict(failures).await;
        if evicted > 0 {
            self.presence.notify(&message.room_id).await;
        }

        DeliveryReport { delivered, evicted }
    }
}
