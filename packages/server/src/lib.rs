//! Room-scoped real-time chat relay.
//!
//! Clients connect over WebSocket to `/ws`, join exactly one room and
//! exchange JSON frames with everyone else in it. The server keeps each
//! room's member list current and pushes it as `active-members` frames.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use bootstrap::build_server;
pub use config::ServerConfig;
pub use ui::Server;
