//! `Connection` trait の実装
//!
//! - `websocket`: tokio-tungstenite を使った実装（再接続・未接続時の送信キュー付き）

pub mod config;
pub mod websocket;

pub use config::ConnectionConfig;
pub use websocket::WebSocketConnection;
