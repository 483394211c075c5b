//! UseCase: 接続セッション（Connection Session）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectionSession::start() / stop() メソッド
//! - 接続状態に応じた join-room の送信と、購読のライフサイクル
//!
//! ### なぜこのテストが必要か
//! - 同じユーザーで start を繰り返しても join-room が重複しない（スナップショットの二重配信を防ぐ）
//! - stop 後にハンドラがストアを変更し続けないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続済み / 未接続での開始
//! - 異常系：ユーザー ID が空
//! - エッジケース：別ユーザーでの再開始、stop の多重呼び出し

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{Connection, UserId};

use super::{
    error::UseCaseError, group_join::GroupJoinWorkflow, router::EventRouter,
    shared_store::SharedStore,
};

struct ActiveSession {
    user_id: UserId,
    task: JoinHandle<()>,
}

/// サインイン中のユーザー 1 人につき 1 つの論理セッション
///
/// 共有の接続そのものは所有せず、その上の購読（イベント処理タスク）だけを管理します。
pub struct ConnectionSession {
    connection: Arc<dyn Connection>,
    store: Arc<SharedStore>,
    workflow: Arc<GroupJoinWorkflow>,
    active: Option<ActiveSession>,
}

impl ConnectionSession {
    pub fn new(
        connection: Arc<dyn Connection>,
        store: Arc<SharedStore>,
        workflow: Arc<GroupJoinWorkflow>,
    ) -> Self {
        Self {
            connection,
            store,
            workflow,
            active: None,
        }
    }

    /// セッションを開始する
    ///
    /// 接続済みなら即座に join-room を送信し、未接続なら次の `Opened` で送信します。
    /// 同じユーザーで実行中なら何もしません。別のユーザーなら前のセッションを止めてから開始します。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 開始した、または既に同じユーザーで実行中
    /// * `Err(UseCaseError::Unauthenticated)` - ユーザー ID が空のため何もしなかった
    pub async fn start(&mut self, user_id: &str) -> Result<(), UseCaseError> {
        let user_id = UserId::new(user_id).map_err(|_| UseCaseError::Unauthenticated)?;

        if let Some(active) = &self.active
            && active.user_id == user_id
            && !active.task.is_finished()
        {
            tracing::debug!("Session for '{}' is already running", user_id);
            return Ok(());
        }
        self.stop();

        // 購読してから接続状態を確認する（その間に開いた接続を取りこぼさない）
        let events = self.connection.subscribe();
        let mut router = EventRouter::new(
            user_id.clone(),
            self.connection.clone(),
            self.store.clone(),
            self.workflow.clone(),
        );
        if self.connection.is_open() {
            router.join_room().await;
        } else {
            tracing::info!("Connection not open yet; joining room for '{}' on open", user_id);
        }

        let task = tokio::spawn(router.run(events));
        tracing::info!("Notification session started for '{}'", user_id);
        self.active = Some(ActiveSession { user_id, task });
        Ok(())
    }

    /// セッションを停止し、購読を解除する（接続は閉じない）
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
            tracing::info!("Notification session stopped for '{}'", active.user_id);
        }
    }

    /// 実行中のセッションのユーザー
    pub fn user_id(&self) -> Option<&UserId> {
        self.active.as_ref().map(|active| &active.user_id)
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionEvent, InboundEvent, OutboundEvent, connection::MockConnection,
        store::test_support::group_buy,
    };
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct Fixture {
        session: ConnectionSession,
        store: Arc<SharedStore>,
        events: broadcast::Sender<ConnectionEvent>,
    }

    fn fixture(mut connection: MockConnection, is_open: bool) -> Fixture {
        let (events, _) = broadcast::channel(16);
        let subscriber = events.clone();
        connection
            .expect_subscribe()
            .returning(move || subscriber.subscribe());
        connection.expect_is_open().return_const(is_open);

        let connection: Arc<dyn Connection> = Arc::new(connection);
        let store = Arc::new(SharedStore::new());
        let workflow = Arc::new(GroupJoinWorkflow::new(connection.clone()));
        let session = ConnectionSession::new(connection, store.clone(), workflow);
        Fixture {
            session,
            store,
            events,
        }
    }

    fn expect_join_room(connection: &mut MockConnection, user: &'static str, times: usize) {
        connection
            .expect_emit()
            .withf(move |event| {
                matches!(event, OutboundEvent::JoinRoom { user_id } if user_id.as_str() == user)
            })
            .times(times)
            .returning(|_| Ok(()));
    }

    /// ルーターのタスクがイベントを処理し終えるまで待つ
    async fn wait_for_total_unread(store: &SharedStore, expected: usize) -> bool {
        for _ in 0..50 {
            if store.read(|s| s.total_unread()).await == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_start_on_open_connection_joins_immediately() {
        // テスト項目: 接続済みなら start で即座に join-room が送信される
        // given (前提条件):
        let mut connection = MockConnection::new();
        expect_join_room(&mut connection, "u1", 1);
        let mut f = fixture(connection, true);

        // when (操作):
        let result = f.session.start("u1").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(f.session.is_running());
        assert_eq!(f.session.user_id().map(|id| id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_start_twice_with_same_user_is_noop() {
        // テスト項目: 同じユーザーで start を繰り返しても join-room は 1 回だけ
        // given (前提条件):
        let mut connection = MockConnection::new();
        expect_join_room(&mut connection, "u1", 1);
        let mut f = fixture(connection, true);
        f.session.start("u1").await.unwrap();

        // when (操作):
        let result = f.session.start("u1").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(f.session.is_running());
    }

    #[tokio::test]
    async fn test_start_without_user_is_noop() {
        // テスト項目: ユーザー ID が空の場合は何も購読・送信しない
        // given (前提条件):
        let mut connection = MockConnection::new();
        connection.expect_emit().times(0);
        connection.expect_subscribe().times(0);
        let store = Arc::new(SharedStore::new());
        let connection: Arc<dyn Connection> = Arc::new(connection);
        let workflow = Arc::new(GroupJoinWorkflow::new(connection.clone()));
        let mut session = ConnectionSession::new(connection, store, workflow);

        // when (操作):
        let result = session.start("").await;

        // then (期待する結果):
        assert_eq!(result, Err(UseCaseError::Unauthenticated));
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_start_before_open_joins_on_opened() {
        // テスト項目: 未接続で開始した場合、Opened を受け取ってから join-room が送信される
        // given (前提条件):
        let mut connection = MockConnection::new();
        expect_join_room(&mut connection, "u1", 1);
        let mut f = fixture(connection, false);
        f.session.start("u1").await.unwrap();

        // when (操作):
        f.events.send(ConnectionEvent::Opened).unwrap();
        f.events
            .send(ConnectionEvent::Inbound(
                InboundEvent::PreviousNotification {
                    chat: None,
                    group_buy: Some(vec![group_buy("A")]),
                },
            ))
            .unwrap();

        // then (期待する結果):
        assert!(wait_for_total_unread(&f.store, 1).await);
    }

    #[tokio::test]
    async fn test_stop_unsubscribes_handlers() {
        // テスト項目: stop 後に届いたイベントはストアを変更しない
        // given (前提条件):
        let mut connection = MockConnection::new();
        expect_join_room(&mut connection, "u1", 1);
        let mut f = fixture(connection, true);
        f.session.start("u1").await.unwrap();

        // when (操作):
        f.session.stop();
        f.session.stop();
        let _ = f.events.send(ConnectionEvent::Inbound(
            InboundEvent::PreviousNotification {
                chat: None,
                group_buy: Some(vec![group_buy("A")]),
            },
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // then (期待する結果):
        assert!(!f.session.is_running());
        assert!(f.session.user_id().is_none());
        assert_eq!(f.store.read(|s| s.total_unread()).await, 0);
    }

    #[tokio::test]
    async fn test_start_with_other_user_restarts_session() {
        // テスト項目: 別ユーザーで start すると前のセッションを止めて新しいユーザーで join-room する
        // given (前提条件):
        let mut connection = MockConnection::new();
        expect_join_room(&mut connection, "u1", 1);
        expect_join_room(&mut connection, "u2", 1);
        let mut f = fixture(connection, true);
        f.session.start("u1").await.unwrap();

        // when (操作):
        let result = f.session.start("u2").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(f.session.user_id().map(|id| id.as_str()), Some("u2"));
    }
}
