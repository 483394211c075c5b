//! Notification Store
//!
//! 2 つの通知コレクションと未読カウンタの唯一の情報源です。
//! 種類ごとのマージ方針は `NotificationStream` の実装に閉じ込め、
//! ストアは `NotificationKind` / `NotificationBatch` で振り分けるだけにしています。
//!
//! | 種類 | スナップショット | インクリメンタル | 未読数 |
//! |---|---|---|---|
//! | チャット | 置き換え | 会話 ID ごとに追記 | 既読境界外のメッセージ数を再計算 |
//! | グループ購入 | 置き換え | ID で重複排除して先頭に追加 | 生き残った件数を加算 |

mod chat;
mod group_buy;
mod stream;

pub use chat::ChatStream;
pub use group_buy::GroupBuyStream;
pub use stream::NotificationStream;

use super::{
    entity::{ChatNotificationGroup, GroupBuyNotification, NotificationBatch, NotificationKind},
    value_object::NotificationId,
};

/// 種類ごとの未読数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadCounts {
    pub chat: usize,
    pub group_buy: usize,
}

impl UnreadCounts {
    pub fn total(&self) -> usize {
        self.chat + self.group_buy
    }
}

/// 通知ストア
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    chat: ChatStream,
    group_buy: GroupBuyStream,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// スナップショットを適用する
    ///
    /// 存在するフィールドのコレクションだけを丸ごと置き換え、対応する未読数を件数に合わせます。
    /// `None` のフィールドには触れません。
    pub fn apply_snapshot(
        &mut self,
        chat: Option<Vec<ChatNotificationGroup>>,
        group_buy: Option<Vec<GroupBuyNotification>>,
    ) {
        if let Some(groups) = chat {
            self.chat.replace(groups);
        }
        if let Some(items) = group_buy {
            self.group_buy.replace(items);
        }
    }

    /// インクリメンタル配信を適用する（空のペイロードは何もしない）
    ///
    /// 「空」は [`NotificationBatch::len`] が 0 のこと。チャットでは会話グループが 0 件を指し、
    /// メッセージを持たないグループだけのバッチは空ではありません（マージ時にそのグループが読み飛ばされます）。
    pub fn apply_incremental(&mut self, batch: NotificationBatch) {
        if batch.is_empty() {
            return;
        }

        match batch {
            NotificationBatch::Chat(groups) => self.chat.merge(groups),
            NotificationBatch::GroupBuy(items) => self.group_buy.merge(items),
        }
    }

    /// 指定した種類の現在のコレクション
    pub fn current(&self, kind: NotificationKind) -> NotificationBatch {
        match kind {
            NotificationKind::Chat => NotificationBatch::Chat(self.chat.items().to_vec()),
            NotificationKind::GroupBuy => {
                NotificationBatch::GroupBuy(self.group_buy.items().to_vec())
            }
        }
    }

    /// 楽観的な既読化
    ///
    /// 指定した種類の未読数だけを 0 にし、既読通知として送るべき現在のコレクションを返します。
    /// コレクションの要素は変わりません。
    pub fn acknowledge(&mut self, kind: NotificationKind) -> NotificationBatch {
        let current = self.current(kind);
        match kind {
            NotificationKind::Chat => self.chat.acknowledge(),
            NotificationKind::GroupBuy => self.group_buy.acknowledge(),
        }
        current
    }

    /// サーバーからの既読確定を反映する
    pub fn confirm_read(&mut self, kind: NotificationKind) {
        match kind {
            NotificationKind::Chat => self.chat.confirm_read(),
            NotificationKind::GroupBuy => self.group_buy.confirm_read(),
        }
    }

    /// セッション終了（ログアウト）時にすべて空に戻す
    pub fn clear(&mut self) {
        self.chat.clear();
        self.group_buy.clear();
    }

    pub fn chat_notifications(&self) -> &[ChatNotificationGroup] {
        self.chat.items()
    }

    pub fn group_buy_notifications(&self) -> &[GroupBuyNotification] {
        self.group_buy.items()
    }

    pub fn group_buy(&self, id: &NotificationId) -> Option<&GroupBuyNotification> {
        self.group_buy.get(id)
    }

    pub fn contains_group_buy(&self, id: &NotificationId) -> bool {
        self.group_buy.contains(id)
    }

    pub fn unread(&self, kind: NotificationKind) -> usize {
        match kind {
            NotificationKind::Chat => self.chat.unread(),
            NotificationKind::GroupBuy => self.group_buy.unread(),
        }
    }

    pub fn unread_counts(&self) -> UnreadCounts {
        UnreadCounts {
            chat: self.chat.unread(),
            group_buy: self.group_buy.unread(),
        }
    }

    /// チャットとグループ購入の未読数の合計
    pub fn total_unread(&self) -> usize {
        self.unread_counts().total()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! テスト用のエンティティ生成ヘルパー

    use crate::domain::{
        entity::{
            ChatNotificationGroup, GroupBuyNotification, GroupSender, GroupSummary, MemberRef,
            Message, MessageSender,
        },
        value_object::{ConversationId, GroupId, MessageId, NotificationId},
    };

    pub fn group_buy(id: &str) -> GroupBuyNotification {
        GroupBuyNotification {
            id: NotificationId::new(id).unwrap(),
            group: GroupSummary {
                id: GroupId::new(format!("group-{}", id)).unwrap(),
                name: format!("Bulk rice {}", id),
                members: vec![MemberRef("u9".to_string())],
            },
            sender: GroupSender {
                name: "bob".to_string(),
                email: "bob@example.com".to_string(),
            },
            is_read: false,
        }
    }

    pub fn message(id: &str) -> Message {
        Message {
            id: MessageId::new(id).unwrap(),
            sender: MessageSender {
                name: "alice".to_string(),
                sent_at: "2024-05-01T00:00:00Z".to_string(),
            },
            content: format!("message {}", id),
        }
    }

    pub fn chat_group(id: Option<&str>, message_ids: &[&str]) -> ChatNotificationGroup {
        ChatNotificationGroup::new(
            id.map(|id| ConversationId::new(id).unwrap()),
            message_ids.iter().map(|m| message(m)).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{chat_group, group_buy};
    use super::*;

    fn group_ids(store: &NotificationStore) -> Vec<&str> {
        store
            .group_buy_notifications()
            .iter()
            .map(|n| n.id.as_str())
            .collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        // テスト項目: 作成直後のストアは空で未読数も 0
        // given (前提条件):

        // when (操作):
        let store = NotificationStore::new();

        // then (期待する結果):
        assert!(store.chat_notifications().is_empty());
        assert!(store.group_buy_notifications().is_empty());
        assert_eq!(store.total_unread(), 0);
    }

    #[test]
    fn test_snapshot_leaves_absent_fields_untouched() {
        // テスト項目: スナップショットに含まれない種類のコレクションは変更されない
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(
            Some(vec![chat_group(Some("c1"), &["m1"])]),
            Some(vec![group_buy("A")]),
        );

        // when (操作):
        store.apply_snapshot(None, Some(vec![group_buy("B"), group_buy("C")]));

        // then (期待する結果):
        assert_eq!(store.chat_notifications().len(), 1);
        assert_eq!(store.unread(NotificationKind::Chat), 1);
        assert_eq!(group_ids(&store), vec!["B", "C"]);
        assert_eq!(store.unread(NotificationKind::GroupBuy), 2);
    }

    #[test]
    fn test_second_chat_snapshot_replaces_first() {
        // テスト項目: 異なるチャットのスナップショットを 2 回適用すると 2 回目だけが残る
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(Some(vec![chat_group(Some("c1"), &["m1", "m2"])]), None);

        // when (操作):
        store.apply_snapshot(Some(vec![chat_group(Some("c2"), &["m3"])]), None);

        // then (期待する結果):
        let groups = store.chat_notifications();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id.as_ref().map(|id| id.as_str()), Some("c2"));
        assert_eq!(store.unread(NotificationKind::Chat), 1);
    }

    #[test]
    fn test_incremental_same_group_buy_twice() {
        // テスト項目: 同じグループ購入通知を 2 回受け取っても 1 件で、未読数は最大 1 増える
        // given (前提条件):
        let mut store = NotificationStore::new();

        // when (操作):
        store.apply_incremental(NotificationBatch::GroupBuy(vec![group_buy("A")]));
        store.apply_incremental(NotificationBatch::GroupBuy(vec![group_buy("A")]));

        // then (期待する結果):
        assert_eq!(group_ids(&store), vec!["A"]);
        assert_eq!(store.unread(NotificationKind::GroupBuy), 1);
    }

    #[test]
    fn test_empty_incremental_is_noop() {
        // テスト項目: 空のインクリメンタル配信はコレクションも未読数も変えない
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(None, Some(vec![group_buy("A"), group_buy("B")]));

        // when (操作):
        store.apply_incremental(NotificationBatch::GroupBuy(vec![]));
        store.apply_incremental(NotificationBatch::Chat(vec![]));

        // then (期待する結果):
        assert_eq!(group_ids(&store), vec!["A", "B"]);
        assert_eq!(store.unread(NotificationKind::GroupBuy), 2);
        assert_eq!(store.unread(NotificationKind::Chat), 0);
    }

    #[test]
    fn test_chat_batch_of_message_less_groups_changes_nothing() {
        // テスト項目: メッセージのない会話だけのチャット配信は、空ではないがストアを変えない
        // given (前提条件):
        let mut store = NotificationStore::new();
        let batch = NotificationBatch::Chat(vec![chat_group(Some("c1"), &[]), chat_group(None, &[])]);
        assert!(!batch.is_empty());

        // when (操作):
        store.apply_incremental(batch);

        // then (期待する結果):
        assert!(store.chat_notifications().is_empty());
        assert_eq!(store.unread(NotificationKind::Chat), 0);
    }

    #[test]
    fn test_snapshot_incremental_acknowledge_scenario() {
        // テスト項目: A,B,C のスナップショット → [B, D] のインクリメンタル → 既読化 の一連の流れ
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(
            None,
            Some(vec![group_buy("A"), group_buy("B"), group_buy("C")]),
        );
        assert_eq!(store.unread(NotificationKind::GroupBuy), 3);

        // when (操作): B は重複、D は新規
        store.apply_incremental(NotificationBatch::GroupBuy(vec![
            group_buy("B"),
            group_buy("D"),
        ]));

        // then (期待する結果):
        assert_eq!(group_ids(&store), vec!["D", "A", "B", "C"]);
        assert_eq!(store.unread(NotificationKind::GroupBuy), 4);

        // when (操作): グループ購入を既読化
        let sent = store.acknowledge(NotificationKind::GroupBuy);

        // then (期待する結果): 未読数は 0、コレクションは変わらない
        assert_eq!(sent.len(), 4);
        assert_eq!(store.unread(NotificationKind::GroupBuy), 0);
        assert_eq!(group_ids(&store), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn test_acknowledge_chat_keeps_group_counter() {
        // テスト項目: チャットの既読化はグループ購入の未読数に影響しない（逆も同様）
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(
            Some(vec![chat_group(Some("c1"), &["m1", "m2"])]),
            Some(vec![group_buy("A")]),
        );

        // when (操作):
        store.acknowledge(NotificationKind::Chat);

        // then (期待する結果):
        assert_eq!(store.unread_counts(), UnreadCounts { chat: 0, group_buy: 1 });

        // when (操作):
        store.apply_incremental(NotificationBatch::Chat(vec![chat_group(Some("c1"), &["m3"])]));
        store.acknowledge(NotificationKind::GroupBuy);

        // then (期待する結果):
        assert_eq!(store.unread_counts(), UnreadCounts { chat: 1, group_buy: 0 });
    }

    #[test]
    fn test_total_unread() {
        // テスト項目: 合計未読数はチャットとグループ購入の和になる
        // given (前提条件):
        let mut store = NotificationStore::new();

        // when (操作):
        store.apply_snapshot(
            Some(vec![chat_group(Some("c1"), &["m1", "m2"])]),
            Some(vec![group_buy("A"), group_buy("B"), group_buy("C")]),
        );

        // then (期待する結果):
        assert_eq!(store.total_unread(), 5);
    }

    #[test]
    fn test_confirm_read_group_buy_sets_is_read() {
        // テスト項目: サーバーの既読確定でグループ購入通知に isRead が立つ
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(None, Some(vec![group_buy("A")]));

        // when (操作):
        store.confirm_read(NotificationKind::GroupBuy);

        // then (期待する結果):
        let a = NotificationId::new("A").unwrap();
        assert_eq!(store.group_buy(&a).map(|n| n.is_read), Some(true));
        assert_eq!(store.unread(NotificationKind::GroupBuy), 0);
    }

    #[test]
    fn test_clear_empties_both_collections() {
        // テスト項目: clear で両方のコレクションと未読数が空に戻る
        // given (前提条件):
        let mut store = NotificationStore::new();
        store.apply_snapshot(
            Some(vec![chat_group(Some("c1"), &["m1"])]),
            Some(vec![group_buy("A")]),
        );

        // when (操作):
        store.clear();

        // then (期待する結果):
        assert!(store.chat_notifications().is_empty());
        assert!(store.group_buy_notifications().is_empty());
        assert_eq!(store.total_unread(), 0);
        assert!(!store.contains_group_buy(&NotificationId::new("A").unwrap()));
    }
}
