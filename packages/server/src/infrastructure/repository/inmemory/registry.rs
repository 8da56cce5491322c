//! InMemory Connection Registry 実装
//!
//! 接続 ID → メタデータのマップと、ルーム → メンバー ID のマップを
//! 1 つの Mutex で保護する。全ての操作はこのロックの中で完結するため、
//! join / leave / members_of は互いに線形化される。
//!
//! ロックはソケット書き込みをまたいで保持されない。
//! `members_of` はロック内でスナップショットをコピーして返す。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, Member, RegistryError, RoomId};

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Member>,
    /// 参加順のメンバー ID。空になったルームは削除する
    rooms: HashMap<RoomId, Vec<ConnectionId>>,
}

impl RegistryState {
    fn snapshot(&self, room_id: &RoomId) -> Vec<Member> {
        self.rooms
            .get(room_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.connections.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// インメモリ Connection Registry 実装
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中の接続数
    pub async fn count_connections(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// 保持しているルーム数（空のルームは含まれない）
    pub async fn count_rooms(&self) -> usize {
        self.state.lock().await.rooms.len()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn join(&self, member: Member) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;
        if state.connections.contains_key(&member.id) {
            return Err(RegistryError::DuplicateConnection(member.id));
        }

        state
            .rooms
            .entry(member.room_id.clone())
            .or_default()
            .push(member.id);
        tracing::debug!(
            "Connection '{}' joined room '{}' as '{}'",
            member.id,
            member.room_id,
            member.display_name
        );
        state.connections.insert(member.id, member);

        Ok(())
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Result<RoomId, RegistryError> {
        let mut state = self.state.lock().await;
        let member = state
            .connections
            .remove(connection_id)
            .ok_or(RegistryError::NotFound(*connection_id))?;

        let now_empty = match state.rooms.get_mut(&member.room_id) {
            Some(ids) => {
                ids.retain(|id| id != connection_id);
                ids.is_empty()
            }
            None => false,
        };
        if now_empty {
            state.rooms.remove(&member.room_id);
            tracing::debug!("Room '{}' is empty and was dropped", member.room_id);
        }

        Ok(member.room_id)
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<Member> {
        self.state.lock().await.snapshot(room_id)
    }

    async fn member(&self, connection_id: &ConnectionId) -> Result<Member, RegistryError> {
        self.state
            .lock()
            .await
            .connections
            .get(connection_id)
            .cloned()
            .ok_or(RegistryError::NotFound(*connection_id))
    }

    async fn rooms(&self) -> Vec<(RoomId, Vec<Member>)> {
        let state = self.state.lock().await;
        let mut rooms: Vec<(RoomId, Vec<Member>)> = state
            .rooms
            .keys()
            .map(|room_id| (room_id.clone(), state.snapshot(room_id)))
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));
        rooms
    }
}
