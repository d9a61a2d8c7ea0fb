//! WebSocket client connection using `tokio-tungstenite`.

use std::fmt;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::{Connection, ConnectionId, TransportError};

/// Close reason reported when the server closed with a reserved code.
///
/// Codes such as 1006 may not appear on the wire, so tungstenite swaps
/// the server's frame for its own `1002 "Protocol violation"` before we
/// see it and the server's reason is gone. The server uses 1006 to
/// refuse a join.
pub const RESERVED_CLOSE_REASON: &str = "server closed with a reserved close code";

/// The frame tungstenite substitutes for one with a reserved code.
const SUBSTITUTED_CLOSE_REASON: &str = "Protocol violation";

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A WebSocket connection to one game room.
///
/// The stream is split so a pending `recv` never blocks a `send`.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Opens a WebSocket to `url` (`ws://` or `wss://`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        let id = ConnectionId::next();
        tracing::debug!(%id, url, "WebSocket connected");

        let (sink, stream) = ws.split();
        Ok(Self {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

impl fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketConnection")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Maps a close frame from the server to what `recv` reports.
fn close_result(frame: Option<CloseFrame>) -> Result<Option<Vec<u8>>, TransportError> {
    match frame {
        Some(frame)
            if frame.code == CloseCode::Protocol
                && frame.reason.as_str() == SUBSTITUTED_CLOSE_REASON =>
        {
            tracing::debug!("server close frame replaced by tungstenite");
            Err(TransportError::ConnectionClosed(RESERVED_CLOSE_REASON.to_owned()))
        }
        Some(frame) if !frame.reason.is_empty() => Err(TransportError::ConnectionClosed(
            frame.reason.as_str().to_owned(),
        )),
        _ => Ok(None),
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        // The server parses text frames; anything that isn't UTF-8 goes
        // out as binary and will be rejected there.
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text.to_string()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(frame))) => return close_result(frame),
                None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
