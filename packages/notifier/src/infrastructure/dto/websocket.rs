//! WebSocket frame DTOs.
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.
//! Field names follow the notification service (`_id`, `groupId`, `senderId`, ...).
//!
//! Inbound lists are decoded item by item: an item that does not fit its DTO is
//! dropped with a warning and the rest of the payload is kept. Display fields
//! treat an explicit `null` like a missing field.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

/// Named event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Event names used on the wire
pub mod event_name {
    pub const JOIN_ROOM: &str = "join-room";
    pub const PREVIOUS_NOTIFICATION: &str = "previous-notification";
    pub const RECEIVE_NOTIFICATION: &str = "receive-notification";
    pub const MARK_READ_MESSAGE: &str = "mark-read-message";
    pub const MARKED_MESSAGE: &str = "marked-message";
    pub const MARK_GROUP_NOTIFICATION: &str = "mark-group-notification";
    pub const MARKED_GROUP_NOTIFICATION: &str = "marked-group-notification";
    pub const JOIN_GROUP: &str = "join-group";
    pub const JOINED_GROUP: &str = "joined-group";
}

/// Serde helpers for tolerant inbound decoding
mod lenient {
    use super::*;

    /// `null` or missing becomes `T::default()`
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// A list whose malformed items are dropped; `null` is an empty list
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
        Ok(decode_items(items.unwrap_or_default()))
    }

    /// Like [`list`], but `null` stays `None`
    pub fn optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
        Ok(items.map(decode_items))
    }

    /// A single item or a list, with malformed items dropped
    pub fn optional_one_or_many<'de, D, T>(
        deserializer: D,
    ) -> Result<Option<OneOrMany<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = Option::<OneOrMany<serde_json::Value>>::deserialize(deserializer)?;
        Ok(items.map(|items| OneOrMany::Many(decode_items(items.into_vec()))))
    }

    fn decode_items<T: DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Dropping malformed item: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Either a single item or a list (incremental pushes use both forms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageSenderDto {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(rename = "sentAt", default, deserialize_with = "lenient::null_as_default")]
    pub sent_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "senderId", default, deserialize_with = "lenient::null_as_default")]
    pub sender: MessageSenderDto,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatNotificationGroupDto {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub message: Vec<MessageDto>,
}

/// A group member: a bare id, an object carrying `_id`, or anything else the service sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberRefDto {
    Id(String),
    Object {
        #[serde(rename = "_id")]
        id: String,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummaryDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub members: Vec<MemberRefDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSenderDto {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBuyNotificationDto {
    #[serde(rename = "_id")]
    pub id: String,
    /// Required: an invitation without its group cannot be joined
    #[serde(rename = "groupId")]
    pub group: GroupSummaryDto,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub sender: GroupSenderDto,
    #[serde(rename = "isRead", default, deserialize_with = "lenient::null_as_default")]
    pub is_read: bool,
}

/// `previous-notification` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousNotificationPayload {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_list"
    )]
    pub message: Option<Vec<ChatNotificationGroupDto>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_list"
    )]
    pub notification: Option<Vec<GroupBuyNotificationDto>>,
}

/// `receive-notification` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiveNotificationPayload {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_one_or_many"
    )]
    pub message: Option<OneOrMany<ChatNotificationGroupDto>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_one_or_many"
    )]
    pub notification: Option<OneOrMany<GroupBuyNotificationDto>>,
}

/// `mark-read-message` / `mark-group-notification` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkReadPayload<T> {
    pub data: Vec<T>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// `join-group` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinGroupPayload {
    #[serde(rename = "notificationId")]
    pub notification_id: String,
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// `joined-group` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedGroupPayload {
    #[serde(rename = "notificationId")]
    pub notification_id: String,
}
