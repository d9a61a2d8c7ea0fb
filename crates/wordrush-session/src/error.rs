//! Error types for the session layer.

use wordrush_transport::TransportError;

/// Errors that can occur while joining a room or touching the local
/// stores that back a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The username is empty or longer than the server accepts.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The configured server URL can't be turned into a room URL.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// Opening the channel failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reading or writing a store file failed.
    #[error("store i/o failed: {0}")]
    Store(#[from] std::io::Error),

    /// A store could not be serialized.
    #[error("store encode failed: {0}")]
    StoreEncode(#[from] serde_json::Error),
}
