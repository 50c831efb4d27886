//! # auth: API Key Middleware
//!
//! Guards the local dashboard routes with an `X-API-Key` header.
//!
//! ## Mode
//! - `DASHBOARD_API_KEY` unset (or empty) → **allow all** (dev mode)
//! - `DASHBOARD_API_KEY` set → every request must send `X-API-Key: <key>`
//!
//! `/health` is always open.
//!
//! ```bash
//! curl -H "X-API-Key: $DASHBOARD_API_KEY" -X POST http://127.0.0.1:3000/api/commands/stop
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

/// The expected key, or `None` for dev mode.
#[derive(Debug, Clone, Default)]
pub struct ApiKey(Option<Arc<str>>);

impl ApiKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.filter(|k| !k.is_empty()).map(Arc::from))
    }
}

pub async fn require_api_key(
    State(expected): State<ApiKey>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected.0 else {
        return next.run(request).await;
    };

    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided == &*expected {
        next.run(request).await
    } else {
        warn!(%path, "❌ Unauthorized request — invalid or missing X-API-Key");
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "ok":    false,
                "error": "Unauthorized: invalid or missing X-API-Key header",
            })),
        )
            .into_response()
    }
}
