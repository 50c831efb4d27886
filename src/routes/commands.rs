//! # routes::commands
//!
//! Write side of the local surface.  Every route hands its command to the
//! dispatcher and answers `202 Accepted` straight away; the outcome arrives
//! later as a `NOTIFICATION` event on `/ws/dashboard`.
//!
//! | Method | Path                            | Command         |
//! |--------|---------------------------------|-----------------|
//! | POST   | `/api/commands/start`           | `start_bot`     |
//! | POST   | `/api/commands/stop`            | `stop_bot`      |
//! | POST   | `/api/commands/squareoff`       | `square_off`    |
//! | POST   | `/api/commands/mode?mode=paper` | `set_mode`      |
//! | POST   | `/api/commands/config`          | `update_config` |

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::SharedSession;
use crate::engine::Command;
use crate::error::AppError;
use crate::models::{ConfigUpdate, TradingMode};

fn accept(session: &SharedSession, command: Command) -> impl IntoResponse {
    let name = command.name();
    drop(session.dispatcher().dispatch(command));
    (
        StatusCode::ACCEPTED,
        Json(json!({ "ok": true, "accepted": name })),
    )
}

/// POST /api/commands/start
pub async fn start_bot(State(session): State<SharedSession>) -> impl IntoResponse {
    accept(&session, Command::StartBot)
}

/// POST /api/commands/stop
pub async fn stop_bot(State(session): State<SharedSession>) -> impl IntoResponse {
    accept(&session, Command::StopBot)
}

/// POST /api/commands/squareoff
pub async fn square_off(State(session): State<SharedSession>) -> impl IntoResponse {
    accept(&session, Command::SquareOff)
}

#[derive(Debug, Deserialize)]
pub struct ModeQuery {
    pub mode: String,
}

/// POST /api/commands/mode?mode=live|paper
pub async fn set_mode(
    State(session): State<SharedSession>,
    Query(query): Query<ModeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mode: TradingMode = query.mode.parse().map_err(AppError::BadRequest)?;
    Ok(accept(&session, Command::SetMode(mode)))
}

/// POST /api/commands/config: partial update; omitted fields are untouched.
pub async fn update_config(
    State(session): State<SharedSession>,
    Json(update): Json<ConfigUpdate>,
) -> Result<impl IntoResponse, AppError> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No configuration fields supplied".to_string()));
    }
    if let Some(0) = update.order_quantity {
        return Err(AppError::BadRequest("order_qty must be positive".to_string()));
    }
    Ok(accept(&session, Command::UpdateConfig(update)))
}
