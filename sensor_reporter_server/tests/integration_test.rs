//! End-to-end tests: a real listener, posts written the way the reporter
//! writes them, and a WebSocket client on `/stream`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use sensor_reporter_core::{payload, SensorReading};
use sensor_reporter_server::{serve, AppState, ServerState};

/// Start a test server on an ephemeral port.
async fn start_test_server() -> (SocketAddr, AppState, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(ServerState::new());

    let server_state = state.clone();
    let handle = tokio::spawn(async move {
        let _ = serve(listener, server_state).await;
    });

    (addr, state, handle)
}

async fn connect_client(addr: SocketAddr) -> WebSocketStream<MaybeTlsStream<TcpStream>> {
    let url = format!("ws://{}/stream", addr);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("Failed to connect");
    ws_stream
}

/// Wait for a text message with timeout.
async fn recv_text(ws: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Result<String, &'static str> {
    match timeout(Duration::from_secs(5), ws.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => Ok(text),
        Ok(Some(Ok(_))) => Err("Received non-text message"),
        Ok(Some(Err(_))) => Err("WebSocket error"),
        Ok(None) => Err("Connection closed"),
        Err(_) => Err("Timeout"),
    }
}

/// Posts `reading` over a raw connection with the same headers the firmware
/// sends, and returns the status line.
async fn post_like_reporter(addr: SocketAddr, reading: &SensorReading) -> String {
    let body = payload::encode(reading).unwrap();
    let request = format!(
        "POST /update HTTP/1.1\r\nHost: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        addr,
        payload::CONTENT_TYPE,
        body.len(),
        body
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
        .await
        .expect("Timeout reading response")
        .unwrap();
    response.lines().next().unwrap_or_default().to_string()
}

#[tokio::test]
async fn reporter_post_is_stored() {
    let (addr, state, handle) = start_test_server().await;

    let status_line = post_like_reporter(addr, &SensorReading::from(2048u16)).await;

    assert_eq!(status_line, "HTTP/1.1 200 OK");
    assert_eq!(state.latest().await, Some(SensorReading::from(2048u16)));

    handle.abort();
}

#[tokio::test]
async fn stream_sends_latest_then_every_new_reading() {
    let (addr, state, handle) = start_test_server().await;
    state.record(SensorReading::from(1u8)).await;

    let mut ws = connect_client(addr).await;
    assert_eq!(recv_text(&mut ws).await.unwrap(), r#"{"sensor_value": 1}"#);

    post_like_reporter(addr, &SensorReading::from(2u8)).await;
    assert_eq!(recv_text(&mut ws).await.unwrap(), r#"{"sensor_value": 2}"#);

    state.record(SensorReading::from_f64(3.5).unwrap()).await;
    assert_eq!(recv_text(&mut ws).await.unwrap(), r#"{"sensor_value": 3.5}"#);

    handle.abort();
}

#[tokio::test]
async fn stream_client_connecting_before_any_reading_waits_for_one() {
    let (addr, state, handle) = start_test_server().await;

    let mut ws = connect_client(addr).await;
    assert!(
        timeout(Duration::from_millis(100), ws.next()).await.is_err(),
        "nothing should be pushed before the first reading"
    );

    // The handler may still be subscribing, keep recording until it is seen
    let mut received = Err("Timeout");
    for value in 0u8..20 {
        state.record(SensorReading::from(value)).await;
        if let Ok(Some(Ok(Message::Text(text)))) =
            timeout(Duration::from_millis(100), ws.next()).await
        {
            received = Ok(text);
            break;
        }
    }
    let text = received.unwrap();
    assert!(payload::decode(&text).is_ok(), "unexpected frame {text}");

    handle.abort();
}
