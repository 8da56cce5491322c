//! Room-scoped WebSocket chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --no-auth
//! ```

use clap::Parser;
use hiroba_server::{ServerConfig, build_server};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room-scoped WebSocket chat relay", long_about = None)]
struct Args {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let server = build_server(&args.config);

    if let Err(e) = server.run(&args.config.host, args.config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
