//! Client execution logic.

use std::time::Duration;

use groupcart_notifier::{
    domain::NotificationKind,
    infrastructure::connection::{ConnectionConfig, WebSocketConnection},
    ui::Notifier,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use super::{
    command::Command, error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt,
};

const CONNECTION_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Settings for one client run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_id: String,
    pub connection: ConnectionConfig,
}

/// Run the interactive client until the user quits or the connection gives up
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let user_id = config.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(ClientError::InvalidUserId(config.user_id));
    }

    let connection = WebSocketConnection::spawn(config.connection.clone());
    let notifier = Notifier::new(connection.clone());
    notifier.start(&user_id).await?;

    tracing::info!("Listening for notifications at {}", config.connection.url);
    println!(
        "\nSigned in as '{}'. Type 'help' for commands. Press Ctrl+C to exit.\n",
        user_id
    );

    // Print the badge whenever a counter changes
    let mut updates = notifier.unread_updates();
    let user_id_for_badge = user_id.clone();
    let badge_task = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let counts = *updates.borrow_and_update();
            print!("{}", MessageFormatter::format_badge(&counts));
            redisplay_prompt(&user_id_for_badge);
        }
    });

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", user_id);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let mut connection_check = tokio::time::interval(CONNECTION_CHECK_INTERVAL);
    let result = loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break Ok(());
                };
                if !execute(&notifier, Command::parse(&line)).await {
                    break Ok(());
                }
            }
            _ = connection_check.tick() => {
                if !connection.is_running() {
                    break Err(ClientError::ConnectionLost(config.connection.url.clone()));
                }
            }
        }
    };

    badge_task.abort();
    notifier.shutdown().await;
    connection.close();
    tracing::info!("Client session ended");

    result
}

/// Execute one command; returns `false` when the client should exit
async fn execute(notifier: &Notifier, command: Command) -> bool {
    match command {
        Command::Chat => {
            let view = notifier.view().await;
            print!("{}", MessageFormatter::format_chat_panel(&view.chat_notifications));
            if let Err(e) = notifier.acknowledge(NotificationKind::Chat).await {
                print!("{}", MessageFormatter::format_error(&e.to_string()));
            }
        }
        Command::Groups => {
            let view = notifier.view().await;
            print!("{}", MessageFormatter::format_group_buy_panel(&view));
            if let Err(e) = notifier.acknowledge(NotificationKind::GroupBuy).await {
                print!("{}", MessageFormatter::format_error(&e.to_string()));
            }
        }
        Command::Join(id) => match notifier.request_join(&id).await {
            Ok(()) => print!("{}", MessageFormatter::format_join_requested(&id)),
            Err(e) => print!("{}", MessageFormatter::format_error(&e.to_string())),
        },
        Command::Status => {
            let counts = notifier.unread_counts().await;
            print!("{}", MessageFormatter::format_badge(&counts));
        }
        Command::Help => print!("{}", MessageFormatter::format_help()),
        Command::Quit => return false,
        Command::Unknown(line) => {
            let message = format!("Unknown command '{}'. Type 'help' for commands.", line);
            print!("{}", MessageFormatter::format_error(&message));
        }
    }
    true
}
