//! In-memory connection pair.
//!
//! Two [`MemoryConnection`]s joined back to back by unbounded channels:
//! whatever one side sends, the other receives, in order. Used to drive
//! the client runtime deterministically without a socket, with the test
//! playing the server on the far end.

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, TransportError};

#[derive(Debug)]
enum Frame {
    Data(Vec<u8>),
    Close(Option<String>),
}

/// One end of an in-memory duplex channel.
#[derive(Debug)]
pub struct MemoryConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Frame>,
    rx: Mutex<mpsc::UnboundedReceiver<Frame>>,
}

impl MemoryConnection {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: ConnectionId::next(),
            tx: a_tx,
            rx: Mutex::new(a_rx),
        };
        let b = Self {
            id: ConnectionId::next(),
            tx: b_tx,
            rx: Mutex::new(b_rx),
        };
        (a, b)
    }

    /// Closes the channel, handing the peer a reason the same way a
    /// WebSocket close frame does.
    pub fn close_with_reason(&self, reason: impl Into<String>) -> Result<(), TransportError> {
        self.tx
            .send(Frame::Close(Some(reason.into())))
            .map_err(|_| closed_error())
    }
}

fn closed_error() -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "peer dropped",
    ))
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx
            .send(Frame::Data(data.to_vec()))
            .map_err(|_| closed_error())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        match self.rx.lock().await.recv().await {
            Some(Frame::Data(data)) => Ok(Some(data)),
            Some(Frame::Close(Some(reason))) if !reason.is_empty() => {
                Err(TransportError::ConnectionClosed(reason))
            }
            Some(Frame::Close(_)) | None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        // The peer may already be gone; closing twice is not an error.
        let _ = self.tx.send(Frame::Close(None));
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
