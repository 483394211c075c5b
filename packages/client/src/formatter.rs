//! Notification formatting utilities for client display.

use groupcart_notifier::{
    domain::{ChatNotificationGroup, MemberRef, UnreadCounts},
    ui::NotificationView,
};
use groupcart_shared::time::format_sent_at;

const RULE: &str = "============================================================";

/// Notification formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the unread badge line
    ///
    /// # Arguments
    ///
    /// * `counts` - Current unread counters
    ///
    /// # Returns
    ///
    /// A single line with both counters and their total
    pub fn format_badge(counts: &UnreadCounts) -> String {
        format!(
            "\n[unread] chat: {} | group-buy: {} | total: {}\n",
            counts.chat,
            counts.group_buy,
            counts.total()
        )
    }

    /// Format the chat panel, one block per conversation
    pub fn format_chat_panel(groups: &[ChatNotificationGroup]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nChat notifications:\n", RULE));

        if groups.iter().all(|group| group.messages.is_empty()) {
            output.push_str("(No messages)\n");
        } else {
            for group in groups.iter().filter(|group| !group.messages.is_empty()) {
                let conversation = group
                    .id
                    .as_ref()
                    .map(|id| id.as_str())
                    .unwrap_or("(no conversation)");
                output.push_str(&format!("# {}\n", conversation));
                for message in &group.messages {
                    output.push_str(&format!(
                        "  @{}: {} ({})\n",
                        message.sender.name,
                        message.content,
                        format_sent_at(&message.sender.sent_at)
                    ));
                }
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the group-buy panel
    ///
    /// Each line shows the notification id (used by `join`), the group, its
    /// member count, who sent the invitation and whether a join is in flight.
    pub fn format_group_buy_panel(view: &NotificationView) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nGroup-buy notifications:\n", RULE));

        if view.group_buy_notifications.is_empty() {
            output.push_str("(No notifications)\n");
        } else {
            for notification in &view.group_buy_notifications {
                let status = if view.is_joining(&notification.id) {
                    " [joining...]"
                } else if notification.is_read {
                    ""
                } else {
                    " [new]"
                };
                output.push_str(&format!(
                    "{}: {} ({}) from {}{}\n",
                    notification.id,
                    notification.group.name,
                    Self::format_member_count(&notification.group.members),
                    notification.sender.name,
                    status
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    fn format_member_count(members: &[MemberRef]) -> String {
        match members.len() {
            1 => "1 member".to_string(),
            n => format!("{} members", n),
        }
    }

    pub fn format_join_requested(notification_id: &str) -> String {
        format!("Join request sent for {}\n", notification_id)
    }

    pub fn format_error(message: &str) -> String {
        format!("! {}\n", message)
    }

    pub fn format_help() -> String {
        [
            "Commands:",
            "  chat   (c)       show chat notifications and mark them as read",
            "  groups (g)       show group-buy notifications and mark them as read",
            "  join   (j) <id>  request to join the group of a group-buy notification",
            "  status (s)       show unread counters",
            "  help   (h)       show this help",
            "  quit   (q)       exit",
            "",
        ]
        .join("\n")
    }
}
