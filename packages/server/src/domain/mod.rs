//! Domain layer: value objects, entities, errors and the collaborator traits
//! the use cases depend on.
//!
//! Concrete implementations live in the infrastructure layer (dependency
//! inversion).

pub mod credential;
pub mod entity;
pub mod error;
pub mod message_store;
pub mod pusher;
pub mod registry;
pub mod value_object;

pub use credential::CredentialStore;
pub use entity::{ChatMessage, Member, PresenceSnapshot, RecordedMessage};
pub use error::{
    AuthError, DeliveryFailure, MessagePushError, PersistenceError, RegistryError,
    ValueObjectError,
};
pub use message_store::MessageStore;
pub use pusher::{MessagePusher, PusherChannel};
pub use registry::ConnectionRegistry;
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DisplayName, MessageText, RoomId, Timestamp,
};
