//! Conversion logic between DTOs and domain entities.

use thiserror::Error;

use crate::domain::{
    ChatNotificationGroup, ConversationId, GroupBuyNotification, GroupId, GroupSender,
    GroupSummary, InboundEvent, MemberRef, Message, MessageId, MessageSender, NotificationBatch,
    NotificationId, OutboundEvent, ValueObjectError,
};
use crate::infrastructure::dto::websocket::{self as dto, Frame, event_name};

/// Errors while decoding an inbound frame
#[derive(Debug, Error)]
pub enum FrameError {
    /// The event name is not one this client handles
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    /// The payload does not match the event's shape
    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// An id in the payload is empty
    #[error("invalid id in '{event}': {source}")]
    InvalidId {
        event: String,
        #[source]
        source: ValueObjectError,
    },
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::MessageDto> for Message {
    type Error = ValueObjectError;

    fn try_from(dto: dto::MessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(dto.id)?,
            sender: MessageSender {
                name: dto.sender.name,
                sent_at: dto.sender.sent_at,
            },
            content: dto.content,
        })
    }
}

impl From<dto::ChatNotificationGroupDto> for ChatNotificationGroup {
    fn from(dto: dto::ChatNotificationGroupDto) -> Self {
        // 空の会話 ID は「ID なし」として扱う
        let id = dto.id.and_then(|id| ConversationId::new(id).ok());
        Self::new(id, convert_all(dto.message, "message"))
    }
}

impl From<dto::MemberRefDto> for MemberRef {
    fn from(dto: dto::MemberRefDto) -> Self {
        match dto {
            dto::MemberRefDto::Id(id) | dto::MemberRefDto::Object { id } => MemberRef(id),
            dto::MemberRefDto::Other(value) => MemberRef(value.to_string()),
        }
    }
}

impl TryFrom<dto::GroupBuyNotificationDto> for GroupBuyNotification {
    type Error = ValueObjectError;

    fn try_from(dto: dto::GroupBuyNotificationDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::new(dto.id)?,
            group: GroupSummary {
                id: GroupId::new(dto.group.id)?,
                name: dto.group.name,
                members: dto.group.members.into_iter().map(MemberRef::from).collect(),
            },
            sender: GroupSender {
                name: dto.sender.name,
                email: dto.sender.email,
            },
            is_read: dto.is_read,
        })
    }
}

/// Convert every item, dropping (and logging) the ones that fail validation
fn convert_all<D, T>(items: Vec<D>, label: &str) -> Vec<T>
where
    T: TryFrom<D, Error = ValueObjectError>,
{
    items
        .into_iter()
        .filter_map(|item| match T::try_from(item) {
            Ok(converted) => Some(converted),
            Err(e) => {
                tracing::warn!("Dropping invalid {}: {}", label, e);
                None
            }
        })
        .collect()
}

fn chat_groups(groups: Vec<dto::ChatNotificationGroupDto>) -> Vec<ChatNotificationGroup> {
    groups.into_iter().map(ChatNotificationGroup::from).collect()
}

fn parse_payload<T: serde::de::DeserializeOwned>(frame: Frame) -> Result<T, FrameError> {
    serde_json::from_value(frame.data).map_err(|source| FrameError::InvalidPayload {
        event: frame.event,
        source,
    })
}

impl TryFrom<Frame> for InboundEvent {
    type Error = FrameError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        match frame.event.as_str() {
            event_name::PREVIOUS_NOTIFICATION => {
                // null payload means "nothing to replace"
                let payload: dto::PreviousNotificationPayload = if frame.data.is_null() {
                    dto::PreviousNotificationPayload::default()
                } else {
                    parse_payload(frame)?
                };
                Ok(InboundEvent::PreviousNotification {
                    chat: payload.message.map(chat_groups),
                    group_buy: payload
                        .notification
                        .map(|items| convert_all(items, "group-buy notification")),
                })
            }
            event_name::RECEIVE_NOTIFICATION => {
                let payload: dto::ReceiveNotificationPayload = if frame.data.is_null() {
                    dto::ReceiveNotificationPayload::default()
                } else {
                    parse_payload(frame)?
                };
                Ok(InboundEvent::ReceiveNotification {
                    chat: payload.message.map(|groups| chat_groups(groups.into_vec())),
                    group_buy: payload
                        .notification
                        .map(|items| convert_all(items.into_vec(), "group-buy notification")),
                })
            }
            event_name::MARKED_MESSAGE => Ok(InboundEvent::MarkedMessage),
            event_name::MARKED_GROUP_NOTIFICATION => Ok(InboundEvent::MarkedGroupNotification),
            event_name::JOINED_GROUP => {
                let event = frame.event.clone();
                let payload: dto::JoinedGroupPayload = parse_payload(frame)?;
                let notification_id = NotificationId::new(payload.notification_id)
                    .map_err(|source| FrameError::InvalidId { event, source })?;
                Ok(InboundEvent::JoinedGroup { notification_id })
            }
            _ => Err(FrameError::UnknownEvent(frame.event)),
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Message> for dto::MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.into_string(),
            sender: dto::MessageSenderDto {
                name: model.sender.name,
                sent_at: model.sender.sent_at,
            },
            content: model.content,
        }
    }
}

impl From<ChatNotificationGroup> for dto::ChatNotificationGroupDto {
    fn from(model: ChatNotificationGroup) -> Self {
        Self {
            id: model.id.map(ConversationId::into_string),
            message: model.messages.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GroupBuyNotification> for dto::GroupBuyNotificationDto {
    fn from(model: GroupBuyNotification) -> Self {
        Self {
            id: model.id.into_string(),
            group: dto::GroupSummaryDto {
                id: model.group.id.into_string(),
                name: model.group.name,
                members: model
                    .group
                    .members
                    .into_iter()
                    .map(|member| dto::MemberRefDto::Id(member.0))
                    .collect(),
            },
            sender: dto::GroupSenderDto {
                name: model.sender.name,
                email: model.sender.email,
            },
            is_read: model.is_read,
        }
    }
}

impl TryFrom<OutboundEvent> for Frame {
    type Error = serde_json::Error;

    fn try_from(event: OutboundEvent) -> Result<Self, Self::Error> {
        let name = event.name();
        let data = match event {
            OutboundEvent::JoinRoom { user_id } => serde_json::Value::String(user_id.into_string()),
            OutboundEvent::MarkRead { data, user_id } => match data {
                NotificationBatch::Chat(groups) => serde_json::to_value(dto::MarkReadPayload {
                    data: groups
                        .into_iter()
                        .map(dto::ChatNotificationGroupDto::from)
                        .collect(),
                    user_id: user_id.into_string(),
                })?,
                NotificationBatch::GroupBuy(items) => serde_json::to_value(dto::MarkReadPayload {
                    data: items
                        .into_iter()
                        .map(dto::GroupBuyNotificationDto::from)
                        .collect(),
                    user_id: user_id.into_string(),
                })?,
            },
            OutboundEvent::JoinGroup {
                notification_id,
                group_id,
                user_id,
            } => serde_json::to_value(dto::JoinGroupPayload {
                notification_id: notification_id.into_string(),
                group_id: group_id.into_string(),
                user_id: user_id.into_string(),
            })?,
        };
        Ok(Frame::new(name, data))
    }
}
