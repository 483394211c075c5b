//! Error types for the notification client.

use groupcart_notifier::usecase::UseCaseError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// User ID is missing or blank
    #[error("Invalid user ID: '{0}'")]
    InvalidUserId(String),

    /// The connection gave up reconnecting
    #[error("Connection to {0} was lost")]
    ConnectionLost(String),

    /// The notifier refused the operation
    #[error(transparent)]
    Notifier(#[from] UseCaseError),
}
