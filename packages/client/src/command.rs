//! Commands typed at the client prompt.

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the chat panel (marks chat notifications as read)
    Chat,
    /// Open the group-buy panel (marks group-buy notifications as read)
    Groups,
    /// Request to join the group referenced by a group-buy notification
    Join(String),
    /// Show the unread badge
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Unknown(String::new());
        };

        match (head.to_ascii_lowercase().as_str(), words.next()) {
            ("chat" | "c", None) => Command::Chat,
            ("groups" | "g", None) => Command::Groups,
            ("join" | "j", Some(id)) if words.next().is_none() => Command::Join(id.to_string()),
            ("status" | "s", None) => Command::Status,
            ("help" | "h" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}
