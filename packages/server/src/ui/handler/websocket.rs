//! WebSocket connection handlers.
//!
//! A connection goes through three states:
//!
//! - `Joining`: upgraded, join parameters not yet accepted. Parameters come
//!   from the query string, or from the first frame when the query carries
//!   no username.
//! - `Joined`: registered in a room. Inbound chat frames are forwarded to the
//!   broadcaster; outbound frames are drained from the connection's queue by
//!   a writer task.
//! - `Closed`: the reader stopped (client close, read error or protocol
//!   violation) or the writer stopped (eviction). The connection is removed
//!   from the registry at most once.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        AuthError, ConnectionId, ConnectionIdFactory, DisplayName, MessageText, RoomId,
        ValueObjectError,
    },
    infrastructure::dto::websocket::{JoinParams, MessageType, WireMessage},
    ui::state::AppState,
    usecase::{ConnectError, DisconnectError, JoinRequest, SendMessageError},
};

type WsSender = SplitSink<WebSocket, Message>;
type WsReceiver = SplitStream<WebSocket>;

/// How long a closing connection may take to flush its outbound queue.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

const MISSING_CREDENTIALS: &str = "Username and password are required";
const MISSING_USERNAME: &str = "Username is required";
const INVALID_CREDENTIALS: &str = "Invalid username or password";
const INTERNAL_ERROR: &str = "Internal server error";
const MALFORMED_JOIN: &str = "Malformed join request";
const MALFORMED_MESSAGE: &str = "Malformed message";

/// Why the inbound reader stopped with an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// A frame that is not a valid chat message. The connection is closed.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("read error: {0}")]
    Transport(String),
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<JoinParams>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, query: JoinParams) {
    let (mut sender, mut receiver) = socket.split();

    // Joining
    let params = if query.has_username() {
        query
    } else {
        match read_join_params(&mut receiver).await {
            Ok(Some(params)) => params,
            Ok(None) => {
                tracing::debug!("Connection closed before joining");
                return;
            }
            Err(ReaderError::ProtocolViolation(reason)) => {
                tracing::warn!("Rejected join request: {}", reason);
                reject(&mut sender, MALFORMED_JOIN).await;
                return;
            }
            Err(ReaderError::Transport(e)) => {
                tracing::debug!("Connection failed before joining: {}", e);
                return;
            }
        }
    };

    let requires_auth = state.connect_participant_usecase.requires_auth();
    let request = match join_request(params, requires_auth) {
        Ok(request) => request,
        Err(text) => {
            tracing::warn!("Rejected join request: {}", text);
            reject(&mut sender, &text).await;
            return;
        }
    };

    let connection_id = ConnectionIdFactory::generate();
    let (tx, rx) = mpsc::channel(state.outbound_queue_capacity.max(1));
    if let Err(e) = state
        .connect_participant_usecase
        .execute(connection_id, request, tx)
        .await
    {
        tracing::warn!("Join refused for connection '{}': {}", connection_id, e);
        reject(&mut sender, connect_error_text(&e)).await;
        return;
    }

    // Joined
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = tokio::spawn(read_loop(receiver, state.clone(), connection_id));

    // If the writer stops first the connection was evicted (or the socket
    // broke), so the reader has nothing left to do.
    let writer_finished = tokio::select! {
        exit = &mut recv_task => {
            match exit {
                Ok(Ok(())) => {
                    tracing::debug!("Connection '{}' closed by client", connection_id);
                }
                Ok(Err(ReaderError::ProtocolViolation(reason))) => {
                    tracing::warn!(
                        "Protocol violation on connection '{}': {}",
                        connection_id,
                        reason
                    );
                    queue_error_frame(&state, &connection_id, MALFORMED_MESSAGE).await;
                }
                Ok(Err(ReaderError::Transport(e))) => {
                    tracing::debug!("Read error on connection '{}': {}", connection_id, e);
                }
                Err(e) => {
                    tracing::error!("Reader task of '{}' failed: {}", connection_id, e);
                }
            }
            false
        }
        _ = &mut send_task => {
            recv_task.abort();
            true
        }
    };

    // Closed
    match state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        Ok(room_id) => {
            tracing::info!(
                "Connection '{}' disconnected from room '{}'",
                connection_id,
                room_id
            );
        }
        Err(DisconnectError::NotFound(_)) => {
            tracing::debug!("Connection '{}' was already evicted", connection_id);
        }
    }

    // The queue sender is gone now, so the writer flushes what is left
    // (including a queued error frame) and closes the socket.
    if !writer_finished
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        tracing::warn!("Writer of '{}' did not drain in time", connection_id);
        send_task.abort();
    }
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: chat and presence frames
/// (via rx channel) are written to this client's WebSocket connection. When the
/// channel closes (the connection was unregistered) a close frame is sent.
///
/// # Arguments
///
/// * `rx` - Outbound queue of this connection
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(mut rx: mpsc::Receiver<String>, mut sender: WsSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(frame.into())).await {
                tracing::debug!("Failed to write frame: {}", e);
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

/// Reads frames of a joined connection until it closes.
async fn read_loop(
    mut receiver: WsReceiver,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) -> Result<(), ReaderError> {
    while let Some(frame) = receiver.next().await {
        let frame = frame.map_err(|e| ReaderError::Transport(e.to_string()))?;
        match frame {
            Message::Text(raw) => {
                let Some(text) = decode_chat_frame(raw.as_str())? else {
                    tracing::warn!("Dropped empty message from '{}'", connection_id);
                    continue;
                };
                match state
                    .send_message_usecase
                    .execute(&connection_id, text)
                    .await
                {
                    Ok(message) => {
                        tracing::debug!(
                            "Queued message from '{}' to room '{}'",
                            message.from,
                            message.room_id
                        );
                    }
                    Err(SendMessageError::NotJoined(_)) => {
                        tracing::debug!("Connection '{}' was evicted, stop reading", connection_id);
                        return Ok(());
                    }
                    Err(SendMessageError::QueueClosed) => {
                        tracing::warn!("Broadcaster stopped, closing '{}'", connection_id);
                        return Ok(());
                    }
                }
            }
            Message::Binary(_) => {
                return Err(ReaderError::ProtocolViolation(
                    "binary frames are not supported".to_string(),
                ));
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => return Ok(()),
        }
    }
    Ok(())
}

/// Waits for the join request frame.
///
/// Returns `Ok(None)` if the client goes away first.
async fn read_join_params(receiver: &mut WsReceiver) -> Result<Option<JoinParams>, ReaderError> {
    while let Some(frame) = receiver.next().await {
        match frame.map_err(|e| ReaderError::Transport(e.to_string()))? {
            Message::Text(raw) => {
                return serde_json::from_str(raw.as_str())
                    .map(Some)
                    .map_err(|e| ReaderError::ProtocolViolation(e.to_string()));
            }
            Message::Binary(_) => {
                return Err(ReaderError::ProtocolViolation(
                    "binary frames are not supported".to_string(),
                ));
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Validates join parameters.
///
/// On failure returns the text of the error frame to send.
fn join_request(params: JoinParams, requires_auth: bool) -> Result<JoinRequest, String> {
    let missing = if requires_auth {
        MISSING_CREDENTIALS
    } else {
        MISSING_USERNAME
    };
    if !params.has_username() {
        return Err(missing.to_string());
    }
    let password = params.password.filter(|p| !p.is_empty());
    if requires_auth && password.is_none() {
        return Err(missing.to_string());
    }

    let display_name = DisplayName::new(params.username.unwrap_or_default())
        .map_err(|e| capitalize(&e))?;
    let room_id = RoomId::from_param(params.room_id.as_deref()).map_err(|e| capitalize(&e))?;

    Ok(JoinRequest {
        room_id,
        display_name,
        password,
    })
}

/// Decodes an inbound frame of a joined connection.
///
/// `Ok(None)` means a chat frame with no text, which is dropped. Anything
/// that is not a chat frame is a protocol violation. The `username` and
/// `room_id` a client puts in the frame are ignored.
fn decode_chat_frame(raw: &str) -> Result<Option<MessageText>, ReaderError> {
    let frame: WireMessage = serde_json::from_str(raw)
        .map_err(|e| ReaderError::ProtocolViolation(e.to_string()))?;

    if frame.r#type != MessageType::Chat {
        return Err(ReaderError::ProtocolViolation(format!(
            "unexpected frame type {:?}",
            frame.r#type
        )));
    }

    match MessageText::new(frame.text.unwrap_or_default()) {
        Ok(text) => Ok(Some(text)),
        Err(ValueObjectError::MessageTextEmpty) => Ok(None),
        Err(e) => Err(ReaderError::ProtocolViolation(e.to_string())),
    }
}

fn connect_error_text(error: &ConnectError) -> &'static str {
    match error {
        ConnectError::Auth(AuthError::MissingCredentials) => MISSING_CREDENTIALS,
        ConnectError::Auth(AuthError::InvalidCredentials) => INVALID_CREDENTIALS,
        ConnectError::Auth(AuthError::Store(_)) => INTERNAL_ERROR,
        ConnectError::DuplicateConnection(_) => INTERNAL_ERROR,
    }
}

fn capitalize(error: &ValueObjectError) -> String {
    let text = error.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}

/// Sends an error frame on a connection that never joined, then closes it.
async fn reject(sender: &mut WsSender, text: &str) {
    match WireMessage::error(text).to_json() {
        Ok(frame) => {
            if let Err(e) = sender.send(Message::Text(frame.into())).await {
                tracing::debug!("Failed to send error frame: {}", e);
                return;
            }
        }
        Err(e) => tracing::error!("Failed to encode error frame: {}", e),
    }
    let _ = sender.send(Message::Close(None)).await;
}

/// Queues an error frame behind whatever is already waiting for this connection.
async fn queue_error_frame(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let frame = match WireMessage::error(text).to_json() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode error frame: {}", e);
            return;
        }
    };
    if let Err(e) = state.message_pusher.push_to(connection_id, &frame).await {
        tracing::debug!("Could not queue error frame: {}", e);
    }
}
