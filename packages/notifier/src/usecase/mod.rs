//! UseCase 層
//!
//! - `session`: 接続セッション（購読のライフサイクルと join-room）
//! - `router`: 受信イベントをストアと参加フローに振り分ける
//! - `read_state`: 既読状態の同期
//! - `group_join`: グループ購入への参加フロー

pub mod error;
pub mod group_join;
pub mod read_state;
pub mod router;
pub mod session;
pub mod shared_store;

pub use error::UseCaseError;
pub use group_join::GroupJoinWorkflow;
pub use read_state::ReadStateSynchronizer;
pub use router::EventRouter;
pub use session::ConnectionSession;
pub use shared_store::SharedStore;
