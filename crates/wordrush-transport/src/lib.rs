//! Transport abstraction layer for the Wordrush client.
//!
//! Provides the [`Connection`] trait: one reliable, ordered, duplex
//! message channel to a game room. The client runtime only ever talks to
//! this trait, so the same session engine runs over a real WebSocket or an
//! in-memory pair in tests.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

mod error;
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::MemoryConnection;
#[cfg(feature = "websocket")]
pub use websocket::{RESERVED_CLOSE_REASON, WebSocketConnection};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next process-unique id.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single duplex channel that can send and receive frames.
///
/// Frames are delivered reliably and in order. `recv` and `send` may be
/// called concurrently from the same task (e.g. from two arms of a
/// `tokio::select!`).
///
/// The futures are `Send` so a generic connection can be driven from a
/// spawned task. Implementations can still use plain `async fn`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one frame to the server.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next frame from the server.
    ///
    /// Returns `Ok(None)` when the channel is closed without a reason.
    /// A close that carries a reason is reported as an error whose
    /// display text includes that reason.
    fn recv(&self) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Closes the channel.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_next_is_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }
}
