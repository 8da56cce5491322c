//! MessagePusher trait 定義
//!
//! 接続ごとの送信キューへのフレーム投入を抽象化する。
//! 実際のソケット書き込みは接続ごとの writer タスクが行うため、
//! ここでの送信はブロックしない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, DeliveryFailure, MessagePushError};

/// 接続ごとの送信キュー（有界）
pub type PusherChannel = mpsc::Sender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録する
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 送信キューを登録解除する
    ///
    /// sender を破棄するため、writer タスクは残りのフレームを書き出した後に終了する
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 1 つの接続へフレームを送る
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へフレームを送る
    ///
    /// 一部の失敗は残りの配信を止めない。
    /// 書き込みに失敗した（= 退去させるべき）接続の一覧を返す。
    /// 既に登録解除済みの接続は失敗として扱わない。
    async fn broadcast(&self, targets: &[ConnectionId], content: &str) -> Vec<DeliveryFailure>;
}
