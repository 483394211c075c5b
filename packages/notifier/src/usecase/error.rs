//! UseCase 層のエラー型
//!
//! いずれも「前提条件を満たさないので何もしなかった」ことを表すガードの結果です。
//! これらのエラーが返るとき、ストア・参加中フラグ・送信のいずれも変化していません。

use thiserror::Error;

use crate::domain::ValueObjectError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    /// サインインしていない（ユーザー ID が空）
    #[error("no signed-in user")]
    Unauthenticated,

    /// 入力の識別子が不正
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    /// ストアに存在しない通知を指定した
    #[error("unknown notification '{0}'")]
    UnknownNotification(String),
}
