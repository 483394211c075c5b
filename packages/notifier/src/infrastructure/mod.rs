//! Infrastructure 層
//!
//! - `dto`: ワイヤー上の JSON フレームと、ドメインモデルとの変換
//! - `connection`: `Connection` trait の WebSocket 実装

pub mod connection;
pub mod dto;
