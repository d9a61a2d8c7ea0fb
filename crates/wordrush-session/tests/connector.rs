//! Joining a room over a real loopback WebSocket.
//!
//! A bare `tokio-tungstenite` server records the request URI of each
//! handshake, so we can check exactly what the connector asked for.

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use wordrush_protocol::RoomId;
use wordrush_session::{
    ConnectorConfig, MemoryTokenStore, MemoryUsernameStore, SessionConnector, SessionError,
    TokenStore, UsernameStore,
};
use wordrush_transport::{Connection, TransportError};

/// Accepts one WebSocket and reports the requested path + query.
async fn spawn_server() -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, uri_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
            let _ = uri_tx.send(req.uri().to_string());
            Ok(resp)
        })
        .await
        .unwrap();
        // Keep the socket open until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
    });

    (format!("ws://{addr}"), uri_rx)
}

fn connector(url: String) -> SessionConnector<MemoryTokenStore, MemoryUsernameStore> {
    SessionConnector::new(
        ConnectorConfig {
            server_url: url,
            ..ConnectorConfig::default()
        },
        MemoryTokenStore::new(),
        MemoryUsernameStore::new(),
    )
}

#[tokio::test]
async fn test_connect_requests_room_path_and_remembers_username() {
    let (url, uri_rx) = spawn_server().await;
    let c = connector(url);

    let conn = c
        .connect(&RoomId::from("abc"), "nat", None)
        .await
        .expect("should connect");

    assert_eq!(uri_rx.await.unwrap(), "/api/room/abc?username=nat");
    assert_eq!(c.usernames().get().as_deref(), Some("nat"));
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_resume_presents_stored_token() {
    let (url, uri_rx) = spawn_server().await;
    let c = connector(url);
    let room = RoomId::from("abc");
    c.tokens().set(&room, "tok-42").unwrap();

    let conn = c.resume(&room, "nat").await.expect("should connect");

    assert_eq!(
        uri_rx.await.unwrap(),
        "/api/room/abc?username=nat&rejoin_token=tok-42"
    );
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_connect_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = connector(format!("ws://{addr}"));
    let err = c
        .connect(&RoomId::from("abc"), "nat", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Transport(TransportError::ConnectFailed(_))
    ));
}
