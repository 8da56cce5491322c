//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::Broadcaster;

use super::{
    handler::{
        get_room_detail, get_room_history, get_rooms, health_check, login, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay
///
/// Owns the handler state and the broadcaster. The broadcaster task is
/// started when the server starts serving.
///
/// # Example
///
/// ```ignore
/// let server = hiroba_server::build_server(&config);
/// server.run(&config.host, config.port).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    broadcaster: Broadcaster,
}

impl Server {
    pub fn new(state: AppState, broadcaster: Broadcaster) -> Self {
        Self {
            state: Arc::new(state),
            broadcaster,
        }
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve_with_shutdown(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Server { state, broadcaster } = self;
        let broadcaster_task = broadcaster.spawn();
        let app = router(state);

        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await;

        broadcaster_task.abort();
        tracing::info!("Server shutdown complete");

        result
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/rooms/{room_id}/messages", get(get_room_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
