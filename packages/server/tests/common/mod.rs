#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use hiroba_server::{ServerConfig, build_server};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestServer {
    pub addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with authentication disabled.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig {
            no_auth: true,
            ..ServerConfig::default()
        })
        .await
    }

    /// Start a test server that checks credentials on join.
    pub async fn with_auth() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = build_server(&config);
        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(listener, std::future::pending())
                .await
                .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _handle: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, query: &str) -> String {
        if query.is_empty() {
            format!("ws://{}/ws", self.addr)
        } else {
            format!("ws://{}/ws?{}", self.addr, query)
        }
    }

    /// Connect and join `room` as `username` through the query string.
    pub async fn join(&self, room: &str, username: &str) -> WsStream {
        ws_connect(&self.ws_url(&format!("room_id={room}&username={username}"))).await
    }

    /// Register an account through the login endpoint.
    pub async fn sign_up(&self, username: &str, password: &str) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/login", self.base_url()))
            .json(&serde_json::json!({"username": username, "password": password}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

/// Read the next JSON frame, skipping control frames.
///
/// Returns `None` once the server closes the connection.
pub async fn ws_read_json(stream: &mut WsStream) -> Option<Value> {
    loop {
        let next = tokio::time::timeout(READ_TIMEOUT, stream.next())
            .await
            .expect("timed out waiting for a frame");
        match next {
            Some(Ok(Message::Text(text))) => {
                return Some(serde_json::from_str(text.as_str()).unwrap());
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

/// Read frames until an `active-members` frame arrives and return its list.
pub async fn ws_read_members(stream: &mut WsStream) -> Vec<String> {
    loop {
        let frame = ws_read_json(stream).await.expect("connection closed");
        if frame["type"] == "active-members" {
            return serde_json::from_value(frame["active_members"].clone()).unwrap();
        }
    }
}

/// Read frames until a `chat` frame arrives.
pub async fn ws_read_chat(stream: &mut WsStream) -> Value {
    loop {
        let frame = ws_read_json(stream).await.expect("connection closed");
        if frame["type"] == "chat" {
            return frame;
        }
    }
}

pub async fn ws_send_json(stream: &mut WsStream, value: Value) {
    stream
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

pub async fn ws_send_chat(stream: &mut WsStream, text: &str) {
    ws_send_json(stream, serde_json::json!({"type": "chat", "text": text})).await;
}
