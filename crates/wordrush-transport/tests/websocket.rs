//! Integration tests for the WebSocket client connection.
//!
//! These tests stand up a bare `tokio-tungstenite` server on a random
//! loopback port and check that frames, close frames and close reasons
//! flow through [`WebSocketConnection`] as the client runtime expects.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use wordrush_transport::{
        Connection, RESERVED_CLOSE_REASON, TransportError, WebSocketConnection,
    };

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on an OS-assigned port and returns it with its URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("ws://{addr}/api/room/abc?username=nat"))
    }

    async fn accept(listener: TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive_text_frames() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url)
            .await
            .expect("client should connect");
        let mut server_ws = server.await.expect("task should complete");
        assert!(format!("{client:?}").contains(&format!("{:?}", client.id())));

        // --- Server pushes a JSON text frame ---
        server_ws
            .send(Message::text(r#"{"type":"StartingCountdown","time_left":3}"#))
            .await
            .unwrap();
        let received = client.recv().await.expect("recv ok").expect("some data");
        assert_eq!(received, br#"{"type":"StartingCountdown","time_left":3}"#);

        // --- Client sends; JSON goes out as a text frame ---
        client.send(br#"{"type":"Ready"}"#).await.expect("send ok");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_data().as_ref(), br#"{"type":"Ready"}"#);

        client.close().await.expect("close ok");
    }

    #[tokio::test]
    async fn test_websocket_close_with_reason_is_reported() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws
            .close(Some(CloseFrame {
                code: CloseCode::Policy,
                reason: "Username too long (max 20 characters)".into(),
            }))
            .await
            .unwrap();

        let err = client.recv().await.expect_err("close with reason is an error");
        assert!(matches!(
            err,
            TransportError::ConnectionClosed(ref r) if r == "Username too long (max 20 characters)"
        ));
    }

    #[tokio::test]
    async fn test_websocket_reserved_close_code_is_reported() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        // 1006 may not be sent on the wire; the reason cannot survive it.
        server_ws
            .close(Some(CloseFrame {
                code: CloseCode::Abnormal,
                reason: "Username too long (max 20 characters)".into(),
            }))
            .await
            .unwrap();

        let err = client.recv().await.expect_err("refusal is an error");
        assert!(matches!(
            err,
            TransportError::ConnectionClosed(ref r) if r == RESERVED_CLOSE_REASON
        ));
    }


    #[tokio::test]
    async fn test_websocket_plain_close_returns_none() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();
        server_ws.send(Message::Close(None)).await.unwrap();

        let result = client.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on plain close");
    }

    #[tokio::test]
    async fn test_websocket_connect_refused() {
        // Bind then drop to get a port that nothing listens on.
        let (listener, url) = listen().await;
        drop(listener);

        let result = WebSocketConnection::connect(&url).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }
}
