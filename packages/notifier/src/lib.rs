//! Real-time notification aggregator for the groupcart storefront.
//!
//! Keeps a live view of two notification streams (chat messages and group-buy
//! invitations) delivered over one persistent connection: snapshot on connect,
//! incremental push, deduplication, per-category unread counters and
//! fire-and-forget read acknowledgement.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
