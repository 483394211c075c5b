//! UseCase: 受信イベントの振り分け
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventRouter::route() メソッド
//! - join-room の送信（接続ごとに 1 回）と、受信イベントのストア・参加フローへの反映
//!
//! ### なぜこのテストが必要か
//! - 再接続時に join-room が再送され、同じ接続で二重に送られないことを保証する
//! - スナップショット / インクリメンタル / 既読確定 / 参加決着がそれぞれ正しく反映されることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続 → スナップショット → インクリメンタル
//! - エッジケース：切断と再接続、空のインクリメンタル

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::{
    Connection, ConnectionEvent, GroupBuyNotification, InboundEvent, NotificationBatch,
    NotificationId, NotificationKind, OutboundEvent, UserId,
};

use super::{group_join::GroupJoinWorkflow, shared_store::SharedStore};

/// 1 ユーザーのセッションに属するイベントハンドラ
///
/// ハンドラは最後まで実行され、ロックを保持したまま I/O を待ちません。
pub struct EventRouter {
    user_id: UserId,
    connection: Arc<dyn Connection>,
    store: Arc<SharedStore>,
    workflow: Arc<GroupJoinWorkflow>,
    /// 現在の接続で join-room を送信済みか
    joined: bool,
}

impl EventRouter {
    pub fn new(
        user_id: UserId,
        connection: Arc<dyn Connection>,
        store: Arc<SharedStore>,
        workflow: Arc<GroupJoinWorkflow>,
    ) -> Self {
        Self {
            user_id,
            connection,
            store,
            workflow,
            joined: false,
        }
    }

    pub fn has_joined(&self) -> bool {
        self.joined
    }

    /// 現在の接続でまだ送っていなければ join-room を送信する
    pub async fn join_room(&mut self) {
        if self.joined {
            return;
        }
        self.joined = true;

        let event = OutboundEvent::JoinRoom {
            user_id: self.user_id.clone(),
        };
        match self.connection.emit(event).await {
            Ok(()) => tracing::info!("Joined notification room for '{}'", self.user_id),
            Err(e) => tracing::warn!("Failed to emit 'join-room': {}", e),
        }
    }

    /// イベントを 1 件処理する
    pub async fn route(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => self.join_room().await,
            ConnectionEvent::Closed => {
                tracing::debug!("Connection closed; join-room will be re-issued on reconnect");
                self.joined = false;
            }
            ConnectionEvent::Inbound(inbound) => self.handle_inbound(inbound).await,
        }
    }

    async fn handle_inbound(&self, event: InboundEvent) {
        match event {
            InboundEvent::PreviousNotification { chat, group_buy } => {
                tracing::debug!(
                    "Snapshot received (chat: {:?}, group-buy: {:?})",
                    chat.as_ref().map(Vec::len),
                    group_buy.as_ref().map(Vec::len)
                );
                let touched = group_buy.as_deref().map(ids_of).unwrap_or_default();
                self.store
                    .update(|store| store.apply_snapshot(chat, group_buy))
                    .await;
                self.workflow.settle(&touched).await;
            }
            InboundEvent::ReceiveNotification { chat, group_buy } => {
                if let Some(groups) = chat {
                    tracing::debug!("Incremental chat delivery ({} groups)", groups.len());
                    self.store
                        .update(|store| store.apply_incremental(NotificationBatch::Chat(groups)))
                        .await;
                }
                if let Some(items) = group_buy {
                    tracing::debug!("Incremental group-buy delivery ({} items)", items.len());
                    let touched = ids_of(&items);
                    self.store
                        .update(|store| {
                            store.apply_incremental(NotificationBatch::GroupBuy(items))
                        })
                        .await;
                    self.workflow.settle(&touched).await;
                }
            }
            InboundEvent::MarkedMessage => {
                self.store
                    .update(|store| store.confirm_read(NotificationKind::Chat))
                    .await;
            }
            InboundEvent::MarkedGroupNotification => {
                self.store
                    .update(|store| store.confirm_read(NotificationKind::GroupBuy))
                    .await;
            }
            InboundEvent::JoinedGroup { notification_id } => {
                self.workflow.settle([&notification_id]).await;
            }
        }
    }

    /// 購読が閉じるまでイベントを処理し続ける
    pub async fn run(mut self, mut events: broadcast::Receiver<ConnectionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.route(event).await,
                Err(RecvError::Lagged(skipped)) => {
                    // 取りこぼしは次のスナップショットで補正される
                    tracing::warn!("Notification router lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Connection event stream closed");
                    break;
                }
            }
        }
    }
}

fn ids_of(items: &[GroupBuyNotification]) -> Vec<NotificationId> {
    items.iter().map(|n| n.id.clone()).collect()
}
