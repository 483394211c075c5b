//! UseCase: グループ購入への参加（Group-Join Workflow）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - GroupJoinWorkflow::request_join() / settle() メソッド
//! - 通知 ID ごとの参加中フラグと join-group の送信
//!
//! ### なぜこのテストが必要か
//! - 未ログイン時に 1 件も送信されないことを保証する
//! - 異なる通知への同時リクエストが互いに干渉しないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加リクエストの送信、決着によるフラグ解除
//! - 異常系：ユーザー ID が空、通知 ID が空

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{Connection, GroupId, NotificationId, OutboundEvent, UserId};

use super::error::UseCaseError;

/// 通知ごとの参加リクエストと参加中フラグ
///
/// フラグは UI 向けの参考情報です。リクエストの成否はここでは観測せず、
/// 同じ通知に触れる後続の配信または `joined-group` で解除されます。
pub struct GroupJoinWorkflow {
    connection: Arc<dyn Connection>,
    /// Key: 通知 ID, Value: 参加中か
    pending: Mutex<HashMap<NotificationId, bool>>,
}

impl GroupJoinWorkflow {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// 参加リクエストを送信する
    ///
    /// # Arguments
    ///
    /// * `notification_id` - 操作対象のグループ購入通知
    /// * `group_id` - 参加したいグループ
    /// * `user_id` - サインイン中のユーザー（空なら何もしない）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 参加中にしてリクエストを送信した（送信の成否は問わない）
    /// * `Err(UseCaseError)` - 前提条件を満たさず、何もしなかった
    pub async fn request_join(
        &self,
        notification_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), UseCaseError> {
        let user_id = UserId::new(user_id).map_err(|_| UseCaseError::Unauthenticated)?;
        let notification_id = NotificationId::new(notification_id)?;
        let group_id = GroupId::new(group_id)?;

        self.pending
            .lock()
            .await
            .insert(notification_id.clone(), true);
        tracing::debug!(
            "Requesting to join group '{}' from notification '{}'",
            group_id,
            notification_id
        );

        let event = OutboundEvent::JoinGroup {
            notification_id,
            group_id,
            user_id,
        };
        if let Err(e) = self.connection.emit(event).await {
            tracing::warn!("Failed to emit 'join-group': {}", e);
        }

        Ok(())
    }

    /// 指定した通知の参加中フラグを解除する
    pub async fn settle<'a>(&self, ids: impl IntoIterator<Item = &'a NotificationId>) {
        let mut pending = self.pending.lock().await;
        for id in ids {
            if pending.remove(id).is_some() {
                tracing::debug!("Join request for notification '{}' settled", id);
            }
        }
    }

    pub async fn is_joining(&self, id: &NotificationId) -> bool {
        self.pending.lock().await.get(id).copied().unwrap_or(false)
    }

    /// 参加中フラグのスナップショット
    pub async fn pending(&self) -> HashMap<NotificationId, bool> {
        self.pending.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.pending.lock().await.clear();
    }
}
