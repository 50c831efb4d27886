//! # error
//!
//! Two error families:
//!
//! * [`SyncError`]: anything that goes wrong talking to the bot service
//!   (snapshot reads, command writes, push channel).  None of these are fatal;
//!   the sync layer logs them and keeps retrying.
//! * [`AppError`]: failures of the local dashboard routes.  Axum's
//!   `IntoResponse` impl turns them into `{ "ok": false, "error": ... }` bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── SyncError ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SyncError {
    /// Request never completed: connect failure, timeout, broken body.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {detail}")]
    Status {
        endpoint: String,
        status:   u16,
        detail:   String,
    },

    /// A body or push frame did not match the expected schema.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service accepted the request but refused the command
    /// (`{"status": "error", "message": ...}`).
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl SyncError {
    /// The message to show a user: the service's own detail where it gave one.
    pub fn user_detail(&self) -> String {
        match self {
            SyncError::Status { detail, .. } => detail.clone(),
            SyncError::Rejected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// ─── AppError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
