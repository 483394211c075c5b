//! Data Transfer Objects (DTOs) for the notification service.
//!
//! - `websocket`: frame envelope and event payload DTOs
//! - `conversion`: DTO ↔ domain conversion and frame encode/decode

pub mod conversion;
pub mod websocket;
