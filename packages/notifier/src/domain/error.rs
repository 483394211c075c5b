//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 空文字列（空白のみを含む）は識別子として使えない
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// 接続（トランスポート）レベルのエラー
///
/// 送信は fire-and-forget なので、呼び出し側はこのエラーをログに残して握りつぶします。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// 接続タスクが終了しており、フレームを受け付けられない
    #[error("connection is closed")]
    Closed,

    /// フレームのエンコードに失敗した
    #[error("failed to encode frame: {0}")]
    Encode(String),
}
