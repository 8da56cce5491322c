//! UseCase: プレゼンス通知
//!
//! ルームのメンバーが変わるたびに現在のメンバー一覧を再計算し、
//! ルームの全メンバーへ `active-members` フレームを送る。
//!
//! - スナップショットはキャッシュせず、毎回 Registry から再計算する
//! - 通知は gate で直列化され、メンバーには変更順にスナップショットが届く
//! - 配信中に書き込み失敗を検知したメンバーはまとめて退去させ、
//!   再計算は 1 回だけ行う（失敗ごとに再帰しない）
//!
//! gate はチャット配信とも共有する。join 側は gate を保持したまま
//! 登録からプレゼンス配信までを行うため、参加者の最初のフレームは
//! 常に自分の join を反映したスナップショットになる。

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    domain::{
        ConnectionRegistry, DeliveryFailure, MessagePusher, PresenceSnapshot, RoomId,
    },
    infrastructure::dto::websocket::WireMessage,
};

pub struct PresenceNotifier {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: Mutex<()>,
}

impl PresenceNotifier {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            gate: Mutex::new(()),
        }
    }

    /// ルームの現在のスナップショット（存在しないルームは空）
    pub async fn snapshot(&self, room_id: &RoomId) -> PresenceSnapshot {
        let members = self.registry.members_of(room_id).await;
        PresenceSnapshot::from_members(room_id.clone(), &members)
    }

    /// スナップショットを再計算してルームの全メンバーへ送る
    ///
    /// # Returns
    ///
    /// 最後に配信したスナップショット（メンバーがいなければ `None`）
    pub async fn notify(&self, room_id: &RoomId) -> Option<PresenceSnapshot> {
        let gate = self.sequence().await;
        self.notify_in_sequence(room_id, &gate).await
    }

    /// 配信順序の gate を取得する
    ///
    /// 保持している間、他のプレゼンス通知とチャット配信は待たされる。
    pub async fn sequence(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// `sequence` で取得済みの gate の下で通知する
    pub async fn notify_in_sequence(
        &self,
        room_id: &RoomId,
        _gate: &MutexGuard<'_, ()>,
    ) -> Option<PresenceSnapshot> {
        loop {
            let members = self.registry.members_of(room_id).await;
            if members.is_empty() {
                tracing::debug!("Room '{}' is empty, no presence update", room_id);
                return None;
            }

            let snapshot = PresenceSnapshot::from_members(room_id.clone(), &members);
            let frame = match WireMessage::from(&snapshot).to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to encode presence for '{}': {}", room_id, e);
                    return None;
                }
            };

            let targets: Vec<_> = members.iter().map(|m| m.id).collect();
            let failures = self.message_pusher.broadcast(&targets, &frame).await;
            tracing::info!(
                "Presence for '{}': {} member(s), {} failed",
                room_id,
                targets.len(),
                failures.len()
            );

            // 退去によってメンバーが変わった場合だけもう一度配信する
            if self.evict(failures).await == 0 {
                return Some(snapshot);
            }
        }
    }

    /// 書き込みに失敗した接続を Registry 経由で退去させる
    ///
    /// 退去は冪等。既に別経路で退去済みの接続は数えない。
    ///
    /// # Returns
    ///
    /// 今回実際に退去させた接続数
    pub async fn evict(&self, failures: Vec<DeliveryFailure>) -> usize {
        let mut evicted = 0;
        for failure in failures {
            match self.registry.leave(&failure.connection_id).await {
                Ok(room_id) => {
                    tracing::warn!(
                        "Evicted connection '{}' from room '{}': {}",
                        failure.connection_id,
                        room_id,
                        failure.error
                    );
                    evicted += 1;
                }
                Err(e) => tracing::debug!("Eviction skipped: {}", e),
            }
            self.message_pusher
                .unregister_client(&failure.connection_id)
                .await;
        }
        evicted
    }
}
