//! UseCase layer.
//!
//! - `connect_participant` / `disconnect_participant`: join and leave
//! - `send_message`: hands validated chat to the broadcaster queue
//! - `broadcaster`: the single serial consumer that fans chat out per room
//! - `presence`: recomputes and pushes `active-members` snapshots
//! - `recorder`: writes delivered chat to the message store in order
//! - `authenticate` / `login`: credential checks
//! - `room_query`: read-only room views for the HTTP API

pub mod authenticate;
pub mod broadcaster;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod login;
pub mod presence;
pub mod recorder;
pub mod room_query;
pub mod send_message;

pub use authenticate::AuthenticateUseCase;
pub use broadcaster::{BroadcastHandle, Broadcaster, DeliveryReport};
pub use connect_participant::{ConnectParticipantUseCase, JoinRequest};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, DisconnectError, LoginError, RoomQueryError, SendMessageError};
pub use login::{LoginOutcome, LoginUseCase};
pub use presence::PresenceNotifier;
pub use recorder::MessageRecorder;
pub use room_query::{GetRoomDetailUseCase, GetRoomHistoryUseCase, GetRoomsUseCase};
pub use send_message::SendMessageUseCase;
