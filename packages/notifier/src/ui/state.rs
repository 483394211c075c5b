//! Read-only state exposed to the presentation layer.

use std::collections::HashMap;

use crate::domain::{
    ChatNotificationGroup, GroupBuyNotification, NotificationId, NotificationStore, UnreadCounts,
};

/// Snapshot of everything a renderer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationView {
    pub chat_notifications: Vec<ChatNotificationGroup>,
    pub group_buy_notifications: Vec<GroupBuyNotification>,
    pub unread_chat_count: usize,
    pub unread_group_count: usize,
    /// Key: notification id, Value: join request in flight
    pub is_joining: HashMap<NotificationId, bool>,
}

impl NotificationView {
    pub fn from_store(store: &NotificationStore, is_joining: HashMap<NotificationId, bool>) -> Self {
        let UnreadCounts { chat, group_buy } = store.unread_counts();
        Self {
            chat_notifications: store.chat_notifications().to_vec(),
            group_buy_notifications: store.group_buy_notifications().to_vec(),
            unread_chat_count: chat,
            unread_group_count: group_buy,
            is_joining,
        }
    }

    pub fn total_unread(&self) -> usize {
        self.unread_chat_count + self.unread_group_count
    }

    pub fn is_joining(&self, id: &NotificationId) -> bool {
        self.is_joining.get(id).copied().unwrap_or(false)
    }
}
