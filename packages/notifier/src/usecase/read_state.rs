//! UseCase: 既読状態の同期（Read-State Synchronizer）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ReadStateSynchronizer::acknowledge() メソッド
//! - 楽観的な未読数リセットと既読通知の送信
//!
//! ### なぜこのテストが必要か
//! - 未ログイン時に何も送信しないことを保証する
//! - ある種類の既読化が別の種類の未読数に影響しないことを保証する
//! - 送信が失敗しても未読数は 0 のまま（次のスナップショットで補正される）
//!
//! ### どのような状況を想定しているか
//! - 正常系：チャット / グループ購入の既読化
//! - 異常系：ユーザー ID が空、送信失敗

use std::sync::Arc;

use crate::domain::{Connection, NotificationKind, OutboundEvent, UserId};

use super::{error::UseCaseError, shared_store::SharedStore};

/// 「カテゴリを開いた」操作を、ローカルの未読数リセットと上流への既読通知に変換する
pub struct ReadStateSynchronizer {
    store: Arc<SharedStore>,
    connection: Arc<dyn Connection>,
}

impl ReadStateSynchronizer {
    pub fn new(store: Arc<SharedStore>, connection: Arc<dyn Connection>) -> Self {
        Self { store, connection }
    }

    /// 指定した種類を既読化する
    ///
    /// 未読数はサーバーの確認を待たずに 0 にします。送信の失敗はログに残すだけで、
    /// 次のスナップショットが届くまで未読数は 0 のままです。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 既読化した（送信の成否は問わない）
    /// * `Err(UseCaseError::Unauthenticated)` - ユーザー ID が空のため何もしなかった
    pub async fn acknowledge(
        &self,
        kind: NotificationKind,
        user_id: &str,
    ) -> Result<(), UseCaseError> {
        let user_id = UserId::new(user_id).map_err(|_| UseCaseError::Unauthenticated)?;

        let data = self.store.update(|store| store.acknowledge(kind)).await;
        let unit = match kind {
            NotificationKind::Chat => "conversations",
            NotificationKind::GroupBuy => "notifications",
        };
        tracing::debug!(
            "Acknowledged {} for '{}' ({} {})",
            kind,
            user_id,
            data.len(),
            unit
        );

        let event = OutboundEvent::MarkRead { data, user_id };
        let name = event.name();
        if let Err(e) = self.connection.emit(event).await {
            tracing::warn!("Failed to emit '{}': {}", name, e);
        }

        Ok(())
    }
}
