//! Shared utilities for the groupcart notification packages.

pub mod logger;
pub mod time;
