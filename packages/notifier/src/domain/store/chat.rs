//! チャット通知のストリーム（再同期時は置き換え）

use std::collections::HashSet;

use crate::domain::{entity::ChatNotificationGroup, value_object::MessageId};

use super::stream::NotificationStream;

/// チャット通知のコレクション
///
/// 再接続後は履歴が再配信されうるため、未読数は加算せず
/// 「既読境界に含まれないメッセージ数」として毎回数え直します。
#[derive(Debug, Clone, Default)]
pub struct ChatStream {
    groups: Vec<ChatNotificationGroup>,
    /// 最後の既読化の時点で保持していたメッセージ ID
    read_boundary: HashSet<MessageId>,
    unread: usize,
}

impl ChatStream {
    /// 全会話のメッセージ数
    pub fn message_count(&self) -> usize {
        self.groups.iter().map(|g| g.messages.len()).sum()
    }

    fn merge_group(&mut self, incoming: ChatNotificationGroup) {
        let existing = incoming
            .id
            .as_ref()
            .and_then(|id| self.groups.iter_mut().find(|g| g.id.as_ref() == Some(id)));

        match existing {
            Some(group) => {
                for message in incoming.messages {
                    if !group.contains_message(&message.id) {
                        group.messages.push(message);
                    }
                }
            }
            None => {
                let mut seen = HashSet::new();
                let messages: Vec<_> = incoming
                    .messages
                    .into_iter()
                    .filter(|m| seen.insert(m.id.clone()))
                    .collect();
                if !messages.is_empty() {
                    self.groups
                        .push(ChatNotificationGroup::new(incoming.id, messages));
                }
            }
        }
    }

    fn recount(&mut self) {
        self.unread = self
            .groups
            .iter()
            .flat_map(|g| g.messages.iter())
            .filter(|m| !self.read_boundary.contains(&m.id))
            .count();
    }

    fn mark_boundary(&mut self) {
        let ids: Vec<MessageId> = self
            .groups
            .iter()
            .flat_map(|g| g.messages.iter().map(|m| m.id.clone()))
            .collect();
        self.read_boundary.extend(ids);
        self.unread = 0;
    }
}

impl NotificationStream for ChatStream {
    type Item = ChatNotificationGroup;

    fn items(&self) -> &[ChatNotificationGroup] {
        &self.groups
    }

    fn replace(&mut self, groups: Vec<ChatNotificationGroup>) {
        // スナップショットは「最後の既読化以降の未読すべて」なので境界もリセットする
        self.groups.clear();
        self.read_boundary.clear();
        for group in groups {
            self.merge_group(group);
        }
        self.unread = self.message_count();
    }

    fn merge(&mut self, groups: Vec<ChatNotificationGroup>) {
        for group in groups {
            self.merge_group(group);
        }
        self.recount();
    }

    fn unread(&self) -> usize {
        self.unread
    }

    fn acknowledge(&mut self) {
        self.mark_boundary();
    }

    fn confirm_read(&mut self) {
        self.mark_boundary();
    }

    fn clear(&mut self) {
        self.groups.clear();
        self.read_boundary.clear();
        self.unread = 0;
    }
}
