//! Presentation boundary.
//!
//! `Notifier` wires the session, store, synchronizer and join workflow together
//! and exposes read-only `NotificationView` state for rendering.

mod notifier;
pub mod state;

pub use notifier::Notifier;
pub use state::NotificationView;
