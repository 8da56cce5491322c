//! Connection registry trait 定義
//!
//! 接続とルームの対応関係を管理する唯一の窓口。
//! 全ての操作は互いにアトミックでなければならない（途中状態を観測させない）。

use async_trait::async_trait;

use super::{ConnectionId, DisplayName, Member, RegistryError, RoomId};

/// Connection Registry trait
///
/// Room Table と接続メタデータを排他的に所有する。
/// Broadcaster や Presence Notifier は読み取りのみ行い、
/// メンバーシップの変更は必ずこの trait を経由する。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続をルームに登録する（ルームが無ければ作成）
    ///
    /// 既に登録済みの接続 ID の場合は `DuplicateConnection`
    async fn join(&self, member: Member) -> Result<(), RegistryError>;

    /// 接続をルームとレジストリから削除し、所属していたルームを返す
    ///
    /// 冪等: 2 回目以降は `NotFound` を返し、副作用はない
    async fn leave(&self, connection_id: &ConnectionId) -> Result<RoomId, RegistryError>;

    /// ルームの現在のメンバー（参加順）のスナップショット
    ///
    /// 存在しないルームと空のルームは同一に扱う（空のリスト）
    async fn members_of(&self, room_id: &RoomId) -> Vec<Member>;

    /// 登録済み接続のメタデータ
    async fn member(&self, connection_id: &ConnectionId) -> Result<Member, RegistryError>;

    /// 登録済み接続の表示名
    async fn display_name_of(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<DisplayName, RegistryError> {
        self.member(connection_id).await.map(|m| m.display_name)
    }

    /// メンバーが 1 人以上いる全ルーム（room id 順）
    async fn rooms(&self) -> Vec<(RoomId, Vec<Member>)>;
}
