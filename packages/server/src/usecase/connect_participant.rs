//! UseCase: 参加者接続処理
//!
//! 1. 認証（有効な場合）
//! 2. Registry への登録
//! 3. MessagePusher への送信キュー登録
//! 4. ルームの全メンバーへプレゼンス通知
//!
//! 2〜4 は PresenceNotifier の gate を保持したまま行う。チャット配信も同じ
//! gate を取るため、参加者の送信キューには自分の join を反映した
//! プレゼンスがどのチャットよりも先に積まれる。Inbound Reader は
//! `execute` が返った後に Joined へ遷移する。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    AuthError, ConnectionId, ConnectionRegistry, DisplayName, Member, MessagePusher,
    PusherChannel, RegistryError, RoomId, Timestamp,
};

use super::{AuthenticateUseCase, error::ConnectError, presence::PresenceNotifier};

/// Join に必要なパラメータ（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: RoomId,
    pub display_name: DisplayName,
    pub password: Option<String>,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceNotifier>,
    /// `None` の場合は認証しない
    authenticator: Option<Arc<AuthenticateUseCase>>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceNotifier>,
        authenticator: Option<Arc<AuthenticateUseCase>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
            authenticator,
            clock,
        }
    }

    /// 認証が必要かどうか
    pub fn requires_auth(&self) -> bool {
        self.authenticator.is_some()
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しい接続の ID
    /// * `request` - 検証済みの join パラメータ
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok(Member)` - 登録された参加者
    /// * `Err(ConnectError)` - 認証失敗または重複登録。登録は行われない
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        request: JoinRequest,
        sender: PusherChannel,
    ) -> Result<Member, ConnectError> {
        // 1. 認証
        if let Some(authenticator) = &self.authenticator {
            let password = request
                .password
                .as_deref()
                .ok_or(AuthError::MissingCredentials)?;
            authenticator
                .execute(request.display_name.as_str(), password)
                .await?;
        }

        let gate = self.presence.sequence().await;

        // 2. Registry に登録
        let member = Member::new(
            connection_id,
            request.display_name,
            request.room_id,
            Timestamp::new(self.clock.now_millis()),
        );
        self.registry
            .join(member.clone())
            .await
            .map_err(|e| match e {
                RegistryError::DuplicateConnection(id) | RegistryError::NotFound(id) => {
                    tracing::warn!("Rejected duplicate join for connection '{}'", id);
                    ConnectError::DuplicateConnection(id)
                }
            })?;

        // 3. MessagePusher に送信キューを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        tracing::info!(
            "'{}' joined room '{}' (connection '{}')",
            member.display_name,
            member.room_id,
            member.id
        );

        // 4. プレゼンス通知（本人を含む）
        self.presence
            .notify_in_sequence(&member.room_id, &gate)
            .await;
        drop(gate);

        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        domain::{
            ChatMessage, ConnectionIdFactory, DeliveryFailure, MessagePushError, MessageText,
        },
        infrastructure::{
            dto::websocket::{MessageType, WireMessage},
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryConnectionRegistry, InMemoryCredentialStore},
        },
        usecase::{Broadcaster, DisconnectParticipantUseCase},
    };
    use async_trait::async_trait;
    use hiroba_shared::time::FixedClock;
    use tokio::sync::mpsc;

    struct Fixture {
        registry: Arc<InMemoryConnectionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: ConnectParticipantUseCase,
    }

    fn fixture(authenticator: Option<Arc<AuthenticateUseCase>>) -> Fixture {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let presence = Arc::new(PresenceNotifier::new(registry.clone(), pusher.clone()));
        let usecase = ConnectParticipantUseCase::new(
            registry.clone(),
            pusher.clone(),
            presence,
            authenticator,
            Arc::new(FixedClock::new(5000)),
        );
        Fixture {
            registry,
            pusher,
            usecase,
        }
    }

    fn request(name: &str, room: &str, password: Option<&str>) -> JoinRequest {
        JoinRequest {
            room_id: RoomId::new(room.to_string()).unwrap(),
            display_name: DisplayName::new(name.to_string()).unwrap(),
            password: password.map(str::to_string),
        }
    }

    fn active_members(frame: &str) -> Vec<String> {
        let wire: WireMessage = serde_json::from_str(frame).unwrap();
        wire.active_members.unwrap()
    }

    #[tokio::test]
    async fn test_connect_participant_success() {
        // テスト項目: 新規参加者が登録され、本人にプレゼンスが届く
        // given (前提条件):
        let fx = fixture(None);
        let id = ConnectionIdFactory::generate();
        let (tx, mut rx) = mpsc::channel(8);

        // when (操作):
        let member = fx
            .usecase
            .execute(id, request("alice", "lobby", None), tx)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(member.connected_at, Timestamp::new(5000));
        assert_eq!(fx.registry.count_connections().await, 1);
        assert_eq!(fx.pusher.count_clients().await, 1);
        assert_eq!(active_members(&rx.recv().await.unwrap()), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_second_join_updates_both_members() {
        // テスト項目: bob の参加後、alice と bob の両方に ["alice","bob"] が届く
        // given (前提条件):
        let fx = fixture(None);
        let (alice_tx, mut alice_rx) = mpsc::channel(8);
        let (bob_tx, mut bob_rx) = mpsc::channel(8);
        fx.usecase
            .execute(
                ConnectionIdFactory::generate(),
                request("alice", "lobby", None),
                alice_tx,
            )
            .await
            .unwrap();

        // when (操作):
        fx.usecase
            .execute(
                ConnectionIdFactory::generate(),
                request("bob", "lobby", None),
                bob_tx,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(active_members(&alice_rx.recv().await.unwrap()), vec!["alice"]);
        assert_eq!(
            active_members(&alice_rx.recv().await.unwrap()),
            vec!["alice", "bob"]
        );
        assert_eq!(
            active_members(&bob_rx.recv().await.unwrap()),
            vec!["alice", "bob"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_connection_is_rejected() {
        // テスト項目: 同じ接続 ID での 2 回目の接続は DuplicateConnection
        // given (前提条件):
        let fx = fixture(None);
        let id = ConnectionIdFactory::generate();
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);
        fx.usecase
            .execute(id, request("alice", "lobby", None), tx1)
            .await
            .unwrap();

        // when (操作):
        let result = fx.usecase.execute(id, request("alice", "lobby", None), tx2).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::DuplicateConnection(id)));
        assert_eq!(fx.registry.count_connections().await, 1);
    }

    #[tokio::test]
    async fn test_auth_failure_does_not_register() {
        // テスト項目: 認証に失敗した接続は登録されない
        // given (前提条件):
        let store = Arc::new(InMemoryCredentialStore::with_users([("alice", "secret")]));
        let fx = fixture(Some(Arc::new(AuthenticateUseCase::new(store))));
        let (tx, _rx) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);

        // when (操作):
        let wrong = fx
            .usecase
            .execute(
                ConnectionIdFactory::generate(),
                request("alice", "lobby", Some("guess")),
                tx,
            )
            .await;
        let missing = fx
            .usecase
            .execute(
                ConnectionIdFactory::generate(),
                request("alice", "lobby", None),
                tx2,
            )
            .await;

        // then (期待する結果):
        assert_eq!(wrong, Err(ConnectError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(missing, Err(ConnectError::Auth(AuthError::MissingCredentials)));
        assert_eq!(fx.registry.count_connections().await, 0);
        assert_eq!(fx.pusher.count_clients().await, 0);
    }

    #[tokio::test]
    async fn test_auth_success_registers() {
        // テスト項目: 正しい認証情報で接続できる
        // given (前提条件):
        let store = Arc::new(InMemoryCredentialStore::with_users([("alice", "secret")]));
        let fx = fixture(Some(Arc::new(AuthenticateUseCase::new(store))));
        let (tx, _rx) = mpsc::channel(8);

        // when (操作):
        let result = fx
            .usecase
            .execute(
                ConnectionIdFactory::generate(),
                request("alice", "lobby", Some("secret")),
                tx,
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(fx.usecase.requires_auth());
    }

    /// 送信キューの登録だけが遅い MessagePusher
    struct SlowRegisterPusher {
        inner: WebSocketMessagePusher,
        delay: Duration,
    }

    #[async_trait]
    impl MessagePusher for SlowRegisterPusher {
        async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
            tokio::time::sleep(self.delay).await;
            self.inner.register_client(connection_id, sender).await;
        }

        async fn unregister_client(&self, connection_id: &ConnectionId) {
            self.inner.unregister_client(connection_id).await;
        }

        async fn push_to(
            &self,
            connection_id: &ConnectionId,
            content: &str,
        ) -> Result<(), MessagePushError> {
            self.inner.push_to(connection_id, content).await
        }

        async fn broadcast(&self, targets: &[ConnectionId], content: &str) -> Vec<DeliveryFailure> {
            self.inner.broadcast(targets, content).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_joiner_receives_own_presence_before_chat() {
        // テスト項目: join 処理中に配信されたチャットは、参加者自身のプレゼンスより後に届く
        // given (前提条件): 送信キューの登録に 100ms かかる
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(SlowRegisterPusher {
            inner: WebSocketMessagePusher::new(),
            delay: Duration::from_millis(100),
        });
        let presence = Arc::new(PresenceNotifier::new(registry.clone(), pusher.clone()));
        let usecase = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            pusher.clone(),
            presence.clone(),
            None,
            Arc::new(FixedClock::new(0)),
        ));
        let (broadcaster, _handle) = Broadcaster::new(4, registry, pusher, presence, None);
        let (bob_tx, mut bob_rx) = mpsc::channel(8);
        let joining = {
            let usecase = usecase.clone();
            tokio::spawn(async move {
                usecase
                    .execute(
                        ConnectionIdFactory::generate(),
                        request("bob", "lobby", None),
                        bob_tx,
                    )
                    .await
            })
        };

        // when (操作): bob の登録途中で lobby 宛てのチャットを配信
        tokio::time::sleep(Duration::from_millis(30)).await;
        broadcaster
            .deliver(ChatMessage {
                sender: ConnectionIdFactory::generate(),
                from: DisplayName::new("alice".to_string()).unwrap(),
                room_id: RoomId::new("lobby".to_string()).unwrap(),
                text: MessageText::new("early".to_string()).unwrap(),
                sent_at: Timestamp::new(0),
            })
            .await;
        joining.await.unwrap().unwrap();

        // then (期待する結果):
        let first: WireMessage = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        assert_eq!(first.r#type, MessageType::ActiveMembers);
        assert_eq!(first.active_members, Some(vec!["bob".to_string()]));
        let second: WireMessage = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        assert_eq!(second.r#type, MessageType::Chat);
        assert_eq!(second.text.as_deref(), Some("early"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_and_leaves_end_with_exact_presence() {
        // テスト項目: join / leave が並行しても、残ったメンバーが最後に受け取る一覧は最終的なメンバーと一致する
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let presence = Arc::new(PresenceNotifier::new(registry.clone(), pusher.clone()));
        let connect = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            pusher.clone(),
            presence.clone(),
            None,
            Arc::new(FixedClock::new(0)),
        ));
        let disconnect = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            pusher,
            presence,
        ));

        // when (操作): 20 人が同時に参加し、偶数番目は参加直後に退出する
        let mut tasks = Vec::new();
        for i in 0..20 {
            let connect = connect.clone();
            let disconnect = disconnect.clone();
            tasks.push(tokio::spawn(async move {
                let id = ConnectionIdFactory::generate();
                let (tx, rx) = mpsc::channel(128);
                connect
                    .execute(id, request(&format!("user{i}"), "lobby", None), tx)
                    .await
                    .unwrap();
                if i % 2 == 0 {
                    disconnect.execute(&id).await.unwrap();
                    None
                } else {
                    Some(rx)
                }
            }));
        }
        let mut survivors = Vec::new();
        for task in tasks {
            if let Some(rx) = task.await.unwrap() {
                survivors.push(rx);
            }
        }

        // then (期待する結果):
        let expected: Vec<String> = registry
            .members_of(&RoomId::new("lobby".to_string()).unwrap())
            .await
            .into_iter()
            .map(|m| m.display_name.into_string())
            .collect();
        assert_eq!(expected.len(), 10);
        for mut rx in survivors {
            let mut last = None;
            while let Ok(frame) = rx.try_recv() {
                last = Some(active_members(&frame));
            }
            assert_eq!(last, Some(expected.clone()));
        }
    }
}
