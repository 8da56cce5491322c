//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomDetailUseCase,
        GetRoomHistoryUseCase, GetRoomsUseCase, LoginUseCase, SendMessageUseCase,
    },
};

/// State handed to every handler.
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// LoginUseCase（ログイン・ユーザー登録のユースケース）
    pub login_usecase: Arc<LoginUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomHistoryUseCase（ルーム履歴取得のユースケース）
    pub get_room_history_usecase: Arc<GetRoomHistoryUseCase>,
    /// Used to queue the final error frame of a connection
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Capacity of each connection's outbound queue
    pub outbound_queue_capacity: usize,
}
