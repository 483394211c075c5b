//! Time formatting helpers for notification timestamps.

use chrono::{DateTime, FixedOffset};

/// Format a message `sentAt` value (RFC 3339) in JST for display.
///
/// Values that do not parse are returned unchanged, so a malformed timestamp
/// never hides the notification it belongs to.
pub fn format_sent_at(raw: &str) -> String {
    let Some(jst_offset) = FixedOffset::east_opt(9 * 3600) else {
        return raw.to_string();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(sent_at) => sent_at
            .with_timezone(&jst_offset)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
