//! WebSocket handler for real-time store updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::api::AppState;

/// Maximum serialized update size pushed to clients.
const MAX_MESSAGE_BYTES: usize = 10 * 1024;

/// Handles WebSocket upgrade requests for live dashboard updates.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to store mutations
    let mut rx = state.store.subscribe();

    // Forward store updates to the socket
    let send_task = tokio::spawn(async move {
        while let Ok(update) = rx.recv().await {
            match serde_json::to_string(&update) {
                Ok(json) => {
                    if json.len() > MAX_MESSAGE_BYTES {
                        tracing::warn!(
                            "WebSocket message exceeds {}B limit ({}B), skipping",
                            MAX_MESSAGE_BYTES,
                            json.len()
                        );
                        continue;
                    }

                    if (sender.send(Message::Text(json)).await).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize store update: {}", e);
                }
            }
        }
    });

    // Handle incoming messages (ping/pong, close)
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                Message::Ping(_) => {
                    // axum automatically handles pong responses
                }
                _ => {
                    // Ignore other message types
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}
