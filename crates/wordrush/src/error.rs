//! Unified error type for the Wordrush client.

use wordrush_protocol::ProtocolError;
use wordrush_session::SessionError;
use wordrush_transport::TransportError;

use crate::ActionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `wordrush` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordrushError {
    /// A transport-level error (connect, send, recv, closed).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (username, URL, token store).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A user action was refused before it was sent.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A global `tracing` subscriber was already installed.
    #[error("logging init failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}
