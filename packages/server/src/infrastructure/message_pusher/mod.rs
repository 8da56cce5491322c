//! メッセージ送信（通知）の実装
//!
//! - `websocket`: WebSocket writer タスクへ有界チャンネルで渡す実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
