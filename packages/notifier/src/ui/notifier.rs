//! Notification aggregator facade.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::{
    domain::{Connection, NotificationId, NotificationKind, UnreadCounts, UserId},
    usecase::{
        ConnectionSession, GroupJoinWorkflow, ReadStateSynchronizer, SharedStore, UseCaseError,
    },
};

use super::state::NotificationView;

/// Notification aggregator for one signed-in user at a time
///
/// # Example
///
/// ```ignore
/// let connection = WebSocketConnection::spawn(ConnectionConfig::default());
/// let notifier = Notifier::new(connection);
/// notifier.start("u1").await?;
///
/// notifier.acknowledge(NotificationKind::GroupBuy).await?;
/// let view = notifier.view().await;
/// ```
pub struct Notifier {
    store: Arc<SharedStore>,
    workflow: Arc<GroupJoinWorkflow>,
    synchronizer: ReadStateSynchronizer,
    session: Mutex<ConnectionSession>,
}

impl Notifier {
    /// Create a notifier on top of a shared connection
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        let store = Arc::new(SharedStore::new());
        let workflow = Arc::new(GroupJoinWorkflow::new(connection.clone()));
        let synchronizer = ReadStateSynchronizer::new(store.clone(), connection.clone());
        let session = ConnectionSession::new(connection, store.clone(), workflow.clone());

        Self {
            store,
            workflow,
            synchronizer,
            session: Mutex::new(session),
        }
    }

    /// Start (or keep) the session for `user_id`
    pub async fn start(&self, user_id: &str) -> Result<(), UseCaseError> {
        self.session.lock().await.start(user_id).await
    }

    /// Release event subscriptions; collections are kept
    pub async fn stop(&self) {
        self.session.lock().await.stop();
    }

    /// Logout teardown: stop the session and clear every collection and flag
    pub async fn shutdown(&self) {
        self.stop().await;
        self.store.update(|store| store.clear()).await;
        self.workflow.clear().await;
    }

    pub async fn current_user(&self) -> Option<UserId> {
        self.session.lock().await.user_id().cloned()
    }

    /// Mark a category as read for the current user
    pub async fn acknowledge(&self, kind: NotificationKind) -> Result<(), UseCaseError> {
        let user_id = self.current_user().await.ok_or(UseCaseError::Unauthenticated)?;
        self.synchronizer.acknowledge(kind, user_id.as_str()).await
    }

    /// Request to join the group referenced by a group-buy notification
    pub async fn request_join(&self, notification_id: &str) -> Result<(), UseCaseError> {
        let user_id = self.current_user().await.ok_or(UseCaseError::Unauthenticated)?;
        let id = NotificationId::new(notification_id)?;

        let group_id = self
            .store
            .read(|store| store.group_buy(&id).map(|n| n.group.id.clone()))
            .await
            .ok_or_else(|| UseCaseError::UnknownNotification(notification_id.to_string()))?;

        self.workflow
            .request_join(id.as_str(), group_id.as_str(), user_id.as_str())
            .await
    }

    /// Current state for rendering
    pub async fn view(&self) -> NotificationView {
        let is_joining = self.workflow.pending().await;
        self.store
            .read(|store| NotificationView::from_store(store, is_joining))
            .await
    }

    pub async fn unread_counts(&self) -> UnreadCounts {
        self.store.read(|store| store.unread_counts()).await
    }

    /// Receiver that changes whenever an unread counter changes
    pub fn unread_updates(&self) -> watch::Receiver<UnreadCounts> {
        self.store.subscribe_counts()
    }
}
