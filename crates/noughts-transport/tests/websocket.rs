//! Integration tests for the WebSocket transport.
//!
//! Each test binds to port 0 and reads the assigned port back, so tests
//! can run in parallel without fighting over fixed ports.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use noughts_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Binds a transport, connects one client and returns both ends.
    async fn connected_pair() -> (noughts_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let client = connect_client(&addr).await;
        let conn = server.await.expect("accept task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_bind_port_zero_reports_real_port() {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_websocket_bind_invalid_address_fails() {
        let result = WebSocketTransport::bind("not-an-address").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_websocket_text_frames_flow_both_ways() {
        let (conn, mut client) = connected_pair().await;
        assert!(conn.id().to_string().starts_with("conn-"));
        assert!(conn.peer_addr().is_some());

        conn.send(br#"{"hello":"client"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "utf-8 payloads should go out as text");
        assert_eq!(msg.into_data().as_ref(), br#"{"hello":"client"}"#);

        client
            .send(Message::text(r#"{"hello":"server"}"#.to_string()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(received, br#"{"hello":"server"}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_frames_are_delivered() {
        let (conn, mut client) = connected_pair().await;

        client
            .send(Message::Binary(vec![0xff, 0x00, 0x10].into()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(received, vec![0xff, 0x00, 0x10]);

        conn.send(&[0xff, 0xfe]).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary(), "non utf-8 payloads should go out as binary");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending_is_not_blocked() {
        let (conn, mut client) = connected_pair().await;
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        tokio::time::timeout(std::time::Duration::from_secs(1), conn.send(b"ping"))
            .await
            .expect("send must not wait for the pending recv")
            .expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::text("pong".to_string())).await.unwrap();
        let received = reader.await.unwrap().expect("recv").expect("frame");
        assert_eq!(received, b"pong");
    }

    #[tokio::test]
    async fn test_websocket_close_sends_close_frame() {
        let (conn, mut client) = connected_pair().await;

        conn.close().await.expect("close");

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_close());
    }
}
