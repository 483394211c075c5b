//! 接続の抽象
//!
//! 通知サービスとの永続的な双方向接続を表す trait と、その上を流れるイベントを定義します。
//! 接続はグローバルなシングルトンではなく、`Arc<dyn Connection>` として明示的に注入されます。
//! これによりテストではフェイクのトランスポートに差し替えられます。

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{
    entity::{ChatNotificationGroup, GroupBuyNotification, NotificationBatch, NotificationKind},
    error::ConnectionError,
    value_object::{GroupId, NotificationId, UserId},
};

/// 接続から購読者に配信されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// ハンドシェイクが完了した（再接続を含む）
    Opened,
    /// 接続が失われた
    Closed,
    /// サービスからの名前付きイベント
    Inbound(InboundEvent),
}

/// サービス → クライアントのイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `previous-notification`: (再)接続時のスナップショット
    PreviousNotification {
        chat: Option<Vec<ChatNotificationGroup>>,
        group_buy: Option<Vec<GroupBuyNotification>>,
    },
    /// `receive-notification`: インクリメンタル配信
    ReceiveNotification {
        chat: Option<Vec<ChatNotificationGroup>>,
        group_buy: Option<Vec<GroupBuyNotification>>,
    },
    /// `marked-message`: チャットの既読がサーバー側で確定した
    MarkedMessage,
    /// `marked-group-notification`: グループ購入通知の既読がサーバー側で確定した
    MarkedGroupNotification,
    /// `joined-group`: 参加リクエストの決着
    JoinedGroup { notification_id: NotificationId },
}

/// クライアント → サービスのイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// `join-room`: この接続をユーザーの通知スコープに結びつける
    JoinRoom { user_id: UserId },
    /// `mark-read-message` / `mark-group-notification`: 種類ごとの既読通知
    MarkRead {
        data: NotificationBatch,
        user_id: UserId,
    },
    /// `join-group`: グループ購入への参加リクエスト
    JoinGroup {
        notification_id: NotificationId,
        group_id: GroupId,
        user_id: UserId,
    },
}

impl OutboundEvent {
    /// ワイヤー上のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::JoinRoom { .. } => "join-room",
            OutboundEvent::MarkRead { data, .. } => match data.kind() {
                NotificationKind::Chat => "mark-read-message",
                NotificationKind::GroupBuy => "mark-group-notification",
            },
            OutboundEvent::JoinGroup { .. } => "join-group",
        }
    }
}

/// 通知サービスへの共有接続
///
/// 接続はどのコンポーネントにも専有されません。Session は購読のライフサイクルだけを管理します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connection: Send + Sync {
    /// ハンドシェイク済みで送受信できる状態か
    fn is_open(&self) -> bool;

    /// 以降に発生するイベントを購読する
    fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent>;

    /// イベントを送信する（fire-and-forget）
    ///
    /// 未接続時にキューするか破棄するかはトランスポートが決めます。
    async fn emit(&self, event: OutboundEvent) -> Result<(), ConnectionError>;
}
