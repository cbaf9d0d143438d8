//! GET /ws: upgrades to the live game session protocol.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::session::{self, SessionCoordinator};
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.sessions))
}

async fn handle_socket(socket: WebSocket, sessions: Arc<SessionCoordinator>) {
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut queued) = session::outbox();

    // Writer: the only task that touches the sink.
    let writer = tokio::spawn(async move {
        while let Some(msg) = queued.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Failed to encode server message: {e}");
                    continue;
                }
            };
            // Dropping `queued` on exit closes the outbox, so pending
            // replies to this socket fail as transport errors.
            if let Err(e) = sender.send(Message::Text(text.into())).await {
                debug!("Socket write failed: {e}");
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => sessions.handle_text(text.as_str(), &outbox).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Socket read failed: {e}");
                break;
            }
        }
    }

    sessions.disconnect(&outbox).await;
    // Last sender gone: the writer drains what is queued and exits.
    drop(outbox);
    if let Err(e) = writer.await {
        warn!("Socket writer panicked: {e}");
    }
}
