//! groupcart notification client.
//!
//! Connects to the notification service as the given user, keeps an unread
//! badge for chat and group-buy notifications, and reads commands from stdin.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval by default).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin groupcart-client -- --user-id u1
//! cargo run --bin groupcart-client -- -u u1 --url ws://127.0.0.1:8080/notifications
//! ```

use std::time::Duration;

use clap::Parser;

use groupcart_client::{ClientConfig, run_client};
use groupcart_notifier::infrastructure::connection::{
    ConnectionConfig,
    config::{DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL_SECS, DEFAULT_URL},
};
use groupcart_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "groupcart-client")]
#[command(about = "Terminal client for groupcart chat and group-buy notifications", long_about = None)]
struct Args {
    /// Signed-in user ID
    #[arg(short = 'u', long)]
    user_id: String,

    /// WebSocket URL of the notification service
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Consecutive failed connection attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    max_reconnect_attempts: u32,

    /// Seconds to wait between connection attempts
    #[arg(long, default_value_t = DEFAULT_RECONNECT_INTERVAL_SECS)]
    reconnect_interval_secs: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ClientConfig {
        user_id: args.user_id,
        connection: ConnectionConfig {
            url: args.url,
            max_reconnect_attempts: args.max_reconnect_attempts,
            reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
        },
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
