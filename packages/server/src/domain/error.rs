//! Domain errors.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Validation errors raised while building value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("room id must be at most {0} characters")]
    RoomIdTooLong(usize),

    #[error("display name must not be empty")]
    DisplayNameEmpty,

    #[error("display name must be at most {0} characters")]
    DisplayNameTooLong(usize),

    #[error("display name must not contain control characters")]
    DisplayNameInvalid,

    #[error("message text must not be empty")]
    MessageTextEmpty,

    #[error("message text must be at most {0} characters")]
    MessageTextTooLong(usize),
}

/// Errors returned by the connection registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("connection '{0}' is not registered")]
    NotFound(ConnectionId),
}

/// Errors raised while handing a frame to a connection's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(ConnectionId),

    #[error("outbound queue of client '{0}' is full")]
    ChannelFull(ConnectionId),

    #[error("outbound queue of client '{0}' is closed")]
    ChannelClosed(ConnectionId),
}

/// A member whose write failed during fan-out; it must be evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub connection_id: ConnectionId,
    pub error: MessagePushError,
}

/// Credential check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("credential store error: {0}")]
    Store(String),
}

/// Message store failures. Always logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message store error: {0}")]
pub struct PersistenceError(pub String);
