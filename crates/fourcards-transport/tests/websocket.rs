//! Integration tests for the WebSocket connector.
//!
//! These tests spin up a real WebSocket server with `tokio-tungstenite`
//! and dial it with [`WebSocketConnector`], so bytes actually cross a
//! socket.

#[cfg(feature = "websocket")]
mod websocket {
    use fourcards_transport::{Connection, Connector, TransportError, WebSocketConnector};
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    /// Binds a listener on a random port and returns it with its ws:// URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        (listener, format!("ws://{addr}/websession"))
    }

    #[tokio::test]
    async fn test_connect_send_and_receive_text_frames() {
        let (listener, url) = listen().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("should accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("should upgrade");

            let msg = ws.next().await.unwrap().unwrap();
            assert_eq!(msg.to_text().unwrap(), r#"{"type":"create"}"#);

            ws.send(Message::text(r#"{"type":"id","id":"abc"}"#))
                .await
                .unwrap();
            ws
        });

        let conn = WebSocketConnector
            .connect(&url)
            .await
            .expect("should connect");
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"type":"create"}"#)
            .await
            .expect("send should succeed");

        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"type":"id","id":"abc"}"#);

        let _server_ws = server.await.expect("server task should complete");
        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_server_close() {
        let (listener, url) = listen().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Close(None)).await.unwrap();
        });

        let conn = WebSocketConnector.connect(&url).await.unwrap();
        server.await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (listener, url) = listen().await;
        drop(listener);

        let result = WebSocketConnector.connect(&url).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
    }
}
