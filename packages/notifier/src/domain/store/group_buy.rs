//! グループ購入通知のストリーム（ID 重複排除 + 先頭追加）

use std::collections::HashSet;

use crate::domain::{entity::GroupBuyNotification, value_object::NotificationId};

use super::stream::NotificationStream;

/// グループ購入通知のコレクション
///
/// 各通知は独立した事実なので、インクリメンタル配信は ID で重複排除してから先頭に追加し、
/// 生き残った件数だけ未読数を加算します。
#[derive(Debug, Clone, Default)]
pub struct GroupBuyStream {
    items: Vec<GroupBuyNotification>,
    unread: usize,
}

impl GroupBuyStream {
    pub fn get(&self, id: &NotificationId) -> Option<&GroupBuyNotification> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.get(id).is_some()
    }
}

/// ペイロード内の重複を除去する（先に現れたものを残す）
fn dedup_by_id(
    items: Vec<GroupBuyNotification>,
    seen: &mut HashSet<NotificationId>,
) -> Vec<GroupBuyNotification> {
    items
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect()
}

impl NotificationStream for GroupBuyStream {
    type Item = GroupBuyNotification;

    fn items(&self) -> &[GroupBuyNotification] {
        &self.items
    }

    fn replace(&mut self, items: Vec<GroupBuyNotification>) {
        self.items = dedup_by_id(items, &mut HashSet::new());
        self.unread = self.items.len();
    }

    fn merge(&mut self, items: Vec<GroupBuyNotification>) {
        let mut seen: HashSet<NotificationId> = self.items.iter().map(|n| n.id.clone()).collect();
        let mut survivors = dedup_by_id(items, &mut seen);
        if survivors.is_empty() {
            return;
        }

        self.unread += survivors.len();
        survivors.append(&mut self.items);
        self.items = survivors;
    }

    fn unread(&self) -> usize {
        self.unread
    }

    fn acknowledge(&mut self) {
        self.unread = 0;
    }

    fn confirm_read(&mut self) {
        self.unread = 0;
        for item in &mut self.items {
            item.is_read = true;
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.unread = 0;
    }
}
