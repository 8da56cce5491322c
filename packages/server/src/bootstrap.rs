//! Dependency wiring.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryCredentialStore, InMemoryMessageStore},
    },
    ui::{AppState, Server},
    usecase::{
        AuthenticateUseCase, Broadcaster, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRoomDetailUseCase, GetRoomHistoryUseCase, GetRoomsUseCase, LoginUseCase,
        MessageRecorder, PresenceNotifier, SendMessageUseCase,
    },
};

/// Build a server from its configuration.
///
/// Dependencies are created in order:
/// 1. Repositories (registry, credential store, message store)
/// 2. MessagePusher
/// 3. Presence notifier, history recorder and broadcaster
/// 4. UseCases
/// 5. AppState and Server
///
/// Must be called inside a tokio runtime: the history recorder task is
/// started here.
pub fn build_server(config: &ServerConfig) -> Server {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Repositories (in-memory)
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let credential_store = Arc::new(InMemoryCredentialStore::new());
    let message_store = Arc::new(InMemoryMessageStore::with_room_limit(
        config.history_capacity as usize,
        config.history_room_limit as usize,
    ));

    // 2. MessagePusher
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Presence notifier, history recorder and broadcaster
    let presence = Arc::new(PresenceNotifier::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let recorder = MessageRecorder::spawn(
        message_store.clone(),
        config.broadcast_queue_capacity as usize,
    );
    let (broadcaster, broadcast_handle) = Broadcaster::new(
        config.broadcast_queue_capacity as usize,
        registry.clone(),
        message_pusher.clone(),
        presence.clone(),
        Some(recorder),
    );

    // 4. UseCases
    let authenticator = if config.no_auth {
        tracing::warn!("Authentication is disabled");
        None
    } else {
        Some(Arc::new(AuthenticateUseCase::new(credential_store.clone())))
    };
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        presence.clone(),
        authenticator,
        clock.clone(),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        presence,
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        broadcast_handle,
        clock,
    ));
    let login_usecase = Arc::new(LoginUseCase::new(credential_store));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(registry));
    let get_room_history_usecase = Arc::new(GetRoomHistoryUseCase::new(message_store));

    // 5. AppState and Server
    let state = AppState {
        connect_participant_usecase,
        disconnect_participant_usecase,
        send_message_usecase,
        login_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        get_room_history_usecase,
        message_pusher,
        outbound_queue_capacity: config.outbound_queue_capacity as usize,
    };
    Server::new(state, broadcaster)
}
