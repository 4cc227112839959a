//! WebSocket connection handler.
//!
//! Each connection gets an outbound channel drained by [`pusher_loop`], and
//! its inbound frames are decoded and handed to the [`SessionCoordinator`]
//! one at a time, in arrival order.
//!
//! [`SessionCoordinator`]: crate::usecase::SessionCoordinator

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{infrastructure::dto::websocket::ClientEvent, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards frames queued for this connection to its socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let coordinator = state.session_coordinator.clone();
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = coordinator.connect(tx).await;
    let connection_id = session.connection_id();

    let mut send_task = pusher_loop(rx, sender);

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => coordinator.handle(&mut session, event).await,
                        Err(e) => {
                            tracing::warn!(
                                "Ignoring malformed frame from '{}': {}",
                                connection_id,
                                e
                            );
                        }
                    },
                    Message::Close(_) => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    // Ping/pong is handled by the WebSocket protocol
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    coordinator.disconnect(&mut session).await;
}
