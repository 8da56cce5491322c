//! Server configuration.

use clap::Args;

/// Runtime configuration of the relay.
///
/// Parsed from the command line by the `hiroba-server` binary; tests build it
/// with `Default` and override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = 7777)]
    pub port: u16,

    /// Capacity of the broadcast queue shared by all connections
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub broadcast_queue_capacity: u32,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..))]
    pub outbound_queue_capacity: u32,

    /// Number of chat messages kept per room for the history API
    #[arg(long, default_value_t = 100)]
    pub history_capacity: u32,

    /// Number of rooms whose history is kept; the least recently active is dropped first
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub history_room_limit: u32,

    /// Accept any username without a password
    #[arg(long)]
    pub no_auth: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            broadcast_queue_capacity: 1024,
            outbound_queue_capacity: 256,
            history_capacity: 100,
            history_room_limit: 1024,
            no_auth: false,
        }
    }
}
