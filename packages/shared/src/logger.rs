//! Logging setup utilities for the groupcart notification client.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the notifier library and the calling binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "groupcart-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use groupcart_shared::logger::setup_logger;
///
/// setup_logger("groupcart-client", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "groupcart_notifier={},{}={}",
        default_log_level,
        binary_name.replace('-', "_"),
        default_log_level
    )
}
