//! 値オブジェクト
//!
//! 通知・メッセージ・グループ・ユーザーの識別子。いずれも空でない文字列です。

use std::fmt;

use super::error::ValueObjectError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// 新しい識別子を作成（空文字列・空白のみはエラー）
            pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// サインイン済みユーザーの ID
    UserId,
    "user id"
);
string_id!(
    /// グループ購入通知の ID
    NotificationId,
    "notification id"
);
string_id!(
    /// グループ購入グループの ID
    GroupId,
    "group id"
);
string_id!(
    /// チャットメッセージの ID
    MessageId,
    "message id"
);
string_id!(
    /// チャット会話（通知グループ）の ID
    ConversationId,
    "conversation id"
);
