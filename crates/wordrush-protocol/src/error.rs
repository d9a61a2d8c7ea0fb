//! Error types for the protocol layer.
//!
//! Each crate in Wordrush defines its own error enum. A `ProtocolError`
//! always means a frame could not be turned into (or produced from) a
//! typed message; it never means the connection itself failed.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an action into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into a server message).
    ///
    /// Common causes: malformed JSON, an unknown `"type"` tag, missing
    /// required fields, or a field with the wrong data type. Decode
    /// errors are fatal for the one frame only.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message encoded but breaks a protocol rule, such as the
    /// server's frame size limit.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
