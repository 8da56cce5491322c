//! UseCase errors.

use thiserror::Error;

use crate::domain::{AuthError, ConnectionId, PersistenceError, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("connection '{0}' is not registered")]
    NotFound(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// The session was evicted or never joined.
    #[error("connection '{0}' is not joined to a room")]
    NotJoined(ConnectionId),

    /// The broadcaster has stopped (server shutting down).
    #[error("broadcast queue is closed")]
    QueueClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("invalid username format")]
    InvalidUsername,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error(transparent)]
    Store(#[from] AuthError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomQueryError {
    #[error("room '{0}' not found")]
    RoomNotFound(RoomId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
