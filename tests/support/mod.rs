// Shared primitives for booting arena servers and driving WebSocket clients.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Boot a fresh arena on the current runtime; every caller gets empty slots.
pub async fn spawn_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(arena_server::run(listener));
    addr
}

// WebSocket URL of a fresh arena.
pub async fn spawn_arena() -> String {
    format!("ws://{}/ws", spawn_server().await)
}

pub async fn connect(url: &str) -> Client {
    let (ws, _response) = connect_async(url).await.expect("websocket handshake");
    ws
}

pub async fn send_json(ws: &mut Client, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send frame");
}

pub async fn send_text(ws: &mut Client, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("send frame");
}

// Next JSON frame, or None once the server closed the socket.
pub async fn next_json(ws: &mut Client) -> Option<Value> {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("frame in time")?;
        match msg {
            Ok(Message::Text(text)) => {
                return Some(serde_json::from_str(text.as_str()).expect("server sends json"));
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

// Next frame whose `type` matches, skipping everything else (mostly bullets ticks).
pub async fn next_of_type(ws: &mut Client, kind: &str) -> Value {
    loop {
        let value = next_json(ws).await.expect("socket still open");
        if value["type"] == kind {
            return value;
        }
    }
}

// Positions from a `state` frame as (id, x, y).
pub fn positions(state: &Value) -> Vec<(u64, f64, f64)> {
    state["players"]
        .as_array()
        .expect("players array")
        .iter()
        .map(|p| {
            (
                p["id"].as_u64().expect("id"),
                p["x"].as_f64().expect("x"),
                p["y"].as_f64().expect("y"),
            )
        })
        .collect()
}

// Connect and consume the welcome plus the state broadcast that follows it.
pub async fn join(url: &str) -> (Client, Value) {
    let mut ws = connect(url).await;
    let welcome = next_of_type(&mut ws, "welcome").await;
    next_of_type(&mut ws, "state").await;
    (ws, welcome)
}
