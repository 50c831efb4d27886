//! # routes::dashboard
//!
//! Read side of the local surface.  Renderers either poll
//! `GET /api/dashboard` or hold `ws://host/ws/dashboard` open.
//!
//! | Method   | Path              | Description                                |
//! |----------|-------------------|--------------------------------------------|
//! | GET (WS) | `/ws/dashboard`   | `SNAPSHOT` on connect, then every event    |
//! | GET      | `/api/dashboard`  | Merged state + push connection state       |
//! | GET      | `/health`         | Liveness                                   |

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::SharedSession;

// ─── WebSocket Handler ────────────────────────────────────────────────────────

pub async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(session): State<SharedSession>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, session))
}

async fn handle_socket(socket: WebSocket, session: SharedSession) {
    // Subscribe before reading so nothing between the two is missed.
    let mut rx = session.store().subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("🔌 Dashboard client connected");

    let snapshot = json!({
        "event":      "SNAPSHOT",
        "connection": session.connection(),
        "state":      session.store().read().await,
    })
    .to_string();

    if sender.send(Message::Text(snapshot)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if sender.send(Message::Text(event.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!("Dashboard client lagged, skipped {n} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("🔌 Dashboard client disconnected");
}

// ─── REST ─────────────────────────────────────────────────────────────────────

/// GET /api/dashboard
pub async fn get_dashboard(State(session): State<SharedSession>) -> impl IntoResponse {
    let state = session.store().read().await;
    Json(json!({
        "ok":         true,
        "connection": session.connection(),
        "state":      state,
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
