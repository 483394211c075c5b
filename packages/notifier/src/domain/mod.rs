//! ドメイン層
//!
//! 通知の値オブジェクト・エンティティ・ストア、および接続の抽象（`Connection` trait）を定義します。
//! Infrastructure 層はこの層の trait を実装します（依存性の逆転）。

pub mod connection;
pub mod entity;
pub mod error;
pub mod store;
pub mod value_object;

pub use connection::{Connection, ConnectionEvent, InboundEvent, OutboundEvent};
pub use entity::{
    ChatNotificationGroup, GroupBuyNotification, GroupSender, GroupSummary, MemberRef, Message,
    MessageSender, NotificationBatch, NotificationKind,
};
pub use error::{ConnectionError, ValueObjectError};
pub use store::{NotificationStore, UnreadCounts};
pub use value_object::{ConversationId, GroupId, MessageId, NotificationId, UserId};
