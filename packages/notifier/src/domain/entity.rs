//! エンティティ
//!
//! 2 種類の通知ストリームで扱うドメインモデルを定義します。
//! - チャット通知: 会話ごとの `ChatNotificationGroup`（配信順のメッセージ列）
//! - グループ購入通知: `GroupBuyNotification`（`id` で同一性を判定）

use std::fmt;

use super::value_object::{ConversationId, GroupId, MessageId, NotificationId};

/// 通知の種類
///
/// ストアのマージ方針・未読カウンタ・既読通知のイベント名はすべてこの種類で分岐します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// ダイレクトメッセージのチャット通知
    Chat,
    /// グループ購入の招待通知
    GroupBuy,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Chat => f.write_str("chat"),
            NotificationKind::GroupBuy => f.write_str("group-buy"),
        }
    }
}

/// メッセージ送信者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSender {
    pub name: String,
    /// 送信時刻（サービスが返す RFC 3339 文字列のまま保持）
    pub sent_at: String,
}

/// チャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender: MessageSender,
    pub content: String,
}

/// 会話単位のチャット通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatNotificationGroup {
    /// 会話 ID（ID を持たないグループは他のグループとマージされない）
    pub id: Option<ConversationId>,
    /// 配信順のメッセージ
    pub messages: Vec<Message>,
}

impl ChatNotificationGroup {
    pub fn new(id: Option<ConversationId>, messages: Vec<Message>) -> Self {
        Self { id, messages }
    }

    pub fn contains_message(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }
}

/// グループメンバーへの参照
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef(pub String);

/// 通知が参照するグループ購入グループ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<MemberRef>,
}

/// グループ購入通知の送信者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSender {
    pub name: String,
    pub email: String,
}

/// グループ購入の招待通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBuyNotification {
    pub id: NotificationId,
    pub group: GroupSummary,
    pub sender: GroupSender,
    /// ストアが所有する唯一の可変フィールド。既読確認でのみ変化する
    pub is_read: bool,
}

/// 種類タグ付きの通知の束
///
/// インクリメンタル配信のペイロードと、既読通知で送る現在のコレクションの両方に使います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationBatch {
    Chat(Vec<ChatNotificationGroup>),
    GroupBuy(Vec<GroupBuyNotification>),
}

impl NotificationBatch {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationBatch::Chat(_) => NotificationKind::Chat,
            NotificationBatch::GroupBuy(_) => NotificationKind::GroupBuy,
        }
    }

    /// 要素数（チャットの場合はメッセージ数ではなく会話グループ数）
    pub fn len(&self) -> usize {
        match self {
            NotificationBatch::Chat(groups) => groups.len(),
            NotificationBatch::GroupBuy(items) => items.len(),
        }
    }

    /// 要素が 0 件か（チャットの場合は会話グループが 0 件）
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
