//! In-memory message store.
//!
//! Keeps the most recent `capacity` messages per room; older entries are
//! dropped first. At most `max_rooms` rooms are tracked: recording into a new
//! room beyond that drops the room written least recently.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DisplayName, MessageStore, MessageText, PersistenceError, RecordedMessage, RoomId, Timestamp,
};

/// Default upper bound on the number of rooms with history.
pub const DEFAULT_MAX_ROOMS: usize = 1024;

#[derive(Debug, Default)]
struct RoomHistory {
    /// Value of the write counter at the last write
    last_write: u64,
    messages: VecDeque<RecordedMessage>,
}

#[derive(Debug, Default)]
struct StoreState {
    writes: u64,
    rooms: HashMap<RoomId, RoomHistory>,
}

#[derive(Debug)]
pub struct InMemoryMessageStore {
    capacity: usize,
    max_rooms: usize,
    state: Mutex<StoreState>,
}

impl InMemoryMessageStore {
    pub fn new(capacity: usize) -> Self {
        Self::with_room_limit(capacity, DEFAULT_MAX_ROOMS)
    }

    pub fn with_room_limit(capacity: usize, max_rooms: usize) -> Self {
        Self {
            capacity,
            max_rooms: max_rooms.max(1),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub async fn count_rooms(&self) -> usize {
        self.state.lock().await.rooms.len()
    }
}

impl StoreState {
    fn evict_least_recent(&mut self) {
        let oldest = self
            .rooms
            .iter()
            .min_by_key(|(_, history)| history.last_write)
            .map(|(room_id, _)| room_id.clone());
        if let Some(room_id) = oldest {
            tracing::debug!("Dropped history of room '{}'", room_id);
            self.rooms.remove(&room_id);
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn record_message(
        &self,
        room_id: &RoomId,
        username: &DisplayName,
        text: &MessageText,
        sent_at: Timestamp,
    ) -> Result<(), PersistenceError> {
        if self.capacity == 0 {
            return Ok(());
        }

        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(room_id) && state.rooms.len() >= self.max_rooms {
            state.evict_least_recent();
        }
        state.writes += 1;
        let write = state.writes;

        let history = state.rooms.entry(room_id.clone()).or_default();
        history.last_write = write;
        if history.messages.len() == self.capacity {
            history.messages.pop_front();
        }
        history.messages.push_back(RecordedMessage {
            username: username.clone(),
            text: text.clone(),
            sent_at,
        });
        Ok(())
    }

    async fn history(&self, room_id: &RoomId) -> Result<Vec<RecordedMessage>, PersistenceError> {
        Ok(self
            .state
            .lock()
            .await
            .rooms
            .get(room_id)
            .map(|history| history.messages.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    async fn record(store: &InMemoryMessageStore, room_id: &str, text: &str, at: i64) {
        store
            .record_message(
                &room(room_id),
                &DisplayName::new("alice".to_string()).unwrap(),
                &MessageText::new(text.to_string()).unwrap(),
                Timestamp::new(at),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_history_drops_oldest_beyond_capacity() {
        // テスト項目: 容量を超えると古いメッセージから破棄される
        // given (前提条件):
        let store = InMemoryMessageStore::new(2);

        // when (操作):
        record(&store, "lobby", "one", 1).await;
        record(&store, "lobby", "two", 2).await;
        record(&store, "lobby", "three", 3).await;

        // then (期待する結果):
        let texts: Vec<String> = store
            .history(&room("lobby"))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text.into_string())
            .collect();
        assert_eq!(texts, vec!["two".to_string(), "three".to_string()]);
    }

    #[tokio::test]
    async fn test_history_is_per_room() {
        // テスト項目: 履歴はルームごとに分離される
        // given (前提条件):
        let store = InMemoryMessageStore::new(10);

        // when (操作):
        record(&store, "a", "hello a", 1).await;

        // then (期待する結果):
        assert_eq!(store.history(&room("a")).await.unwrap().len(), 1);
        assert!(store.history(&room("b")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_room_count_is_bounded() {
        // テスト項目: ルーム数が上限に達すると、最も長く書き込みのないルームの履歴が破棄される
        // given (前提条件):
        let store = InMemoryMessageStore::with_room_limit(10, 2);
        record(&store, "a", "first a", 1).await;
        record(&store, "b", "first b", 2).await;
        record(&store, "a", "second a", 3).await;

        // when (操作):
        record(&store, "c", "first c", 4).await;

        // then (期待する結果): b が破棄され、a と c が残る
        assert_eq!(store.count_rooms().await, 2);
        assert!(store.history(&room("b")).await.unwrap().is_empty());
        assert_eq!(store.history(&room("a")).await.unwrap().len(), 2);
        assert_eq!(store.history(&room("c")).await.unwrap().len(), 1);
    }
}
