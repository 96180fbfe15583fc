// Shared primitives for one-time server bootstrapping across integration tests.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Global socket address used by all tests after the server publishes its bound address.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

const READ_TIMEOUT: Duration = Duration::from_secs(5);

// Ensure the test server is running and return its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                coin_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_addr_and_readiness(published_addr);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

fn wait_for_server_addr_and_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_ADDR.set(addr.clone());

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

pub async fn connect() -> Client {
    let url = format!("ws://{}/ws", ensure_server());
    let (client, _response) = connect_async(url).await.expect("websocket handshake");
    client
}

// Next JSON frame from the server, skipping control frames.
pub async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(READ_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for server frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("server sent valid json");
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

pub async fn next_update(client: &mut Client) -> Value {
    let value = next_json(client).await;
    assert_eq!(value["type"], "update", "expected update, got {value}");
    value
}

// Connect and consume the `init` frame.
pub async fn join() -> (Client, String) {
    let mut client = connect().await;
    let init = next_json(&mut client).await;
    assert_eq!(init["type"], "init");
    let id = init["id"].as_str().expect("init carries an id").to_string();
    (client, id)
}

pub async fn send_text(client: &mut Client, text: &str) {
    client
        .send(Message::text(text.to_string()))
        .await
        .expect("send should succeed");
}

pub async fn send_input(client: &mut Client, left: bool, right: bool, up: bool, down: bool) {
    let msg = serde_json::json!({
        "type": "input",
        "inputs": { "left": left, "right": right, "up": up, "down": down }
    });
    send_text(client, &msg.to_string()).await;
}

pub fn own_position(update: &Value, id: &str) -> Option<(f64, f64)> {
    let me = update["players"].get(id)?;
    Some((me["x"].as_f64()?, me["y"].as_f64()?))
}
