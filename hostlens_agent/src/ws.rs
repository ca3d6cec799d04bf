//! WebSocket upgrade and per-connection handler: one JSON tool request per
//! text frame, one envelope array back.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::stream::StreamExt;
use tracing::{debug, warn};

use crate::state::AppState;
use crate::tools;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    while let Some(Ok(msg)) = socket.next().await {
        match msg {
            Message::Text(text) => {
                debug!(request = %text, "tool request");
                let envelope = tools::dispatch_text(&state, &text).await;
                match envelope.to_wire() {
                    Ok(json) => {
                        if socket.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(error = %err, "failed to serialize tool reply"),
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
