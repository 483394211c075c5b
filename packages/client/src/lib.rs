//! Interactive terminal client for groupcart notifications.
//!
//! Shows the unread badge as it changes and lets the user open the chat and
//! group-buy panels (which marks them as read) or request to join a group.

pub mod command;
pub mod error;
pub mod formatter;
mod runner;
mod ui;

pub use runner::{ClientConfig, run_client};
