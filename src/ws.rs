//! WebSocket upgrade and per-connection handler.
//!
//! Each connection gets a session table entry keyed by a process-unique id,
//! an outbox channel the session manager emits into, and a writer task that
//! drains the outbox onto the socket. Commands arrive as bare text frames.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::metrics::now_ms;
use crate::state::AppState;
use crate::types::{ClientCommand, ServerEvent};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = state.next_conn_id.fetch_add(1, Ordering::Relaxed);
    info!(conn = id, "client connected");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.sessions.lock().await.connect(id, tx.clone());

    // Greet the client with the latest snapshot so the first paint doesn't
    // wait a full interval.
    if let Some(snapshot) = state.latest.read().await.clone() {
        let _ = tx.send(ServerEvent::SystemInfo(snapshot));
    }

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match ClientCommand::parse(&text) {
                Some(ClientCommand::StartMonitoring) => {
                    state.sessions.lock().await.start(id, now_ms());
                }
                Some(ClientCommand::StopMonitoring) => {
                    state.sessions.lock().await.stop(id, now_ms());
                }
                Some(ClientCommand::GetMonitoringData) => {
                    state.sessions.lock().await.query(id, now_ms());
                }
                None => debug!(conn = id, "ignoring unknown command: {text:?}"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Remove the entry before returning so no later tick sees it.
    state.sessions.lock().await.disconnect(id);
    info!(conn = id, "client disconnected");

    drop(tx);
    let _ = writer.await;
}
