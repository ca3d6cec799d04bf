//! Minimal WebSocket helpers for one-shot tool calls against the agent.

use anyhow::{anyhow, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream> {
    let (ws, _) = connect_async(url).await.context("connect to agent")?;
    Ok(ws)
}

/// Send one tool request and await the single JSON reply frame.
pub async fn call_tool(ws: &mut WsStream, request: &Value) -> Result<Value> {
    let frame = serde_json::to_string(request)?;
    ws.send(Message::Text(frame.into()))
        .await
        .context("send tool request")?;

    while let Some(msg) = ws.next().await {
        match msg.context("read tool reply")? {
            Message::Text(json) => {
                return serde_json::from_str(&json).context("parse tool reply")
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(anyhow!("connection closed before a reply arrived"))
}
