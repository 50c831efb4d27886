//! Local HTTP/WebSocket surface for dashboard renderers.

pub mod commands;
pub mod dashboard;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{require_api_key, ApiKey};
use crate::engine::Session;

pub type SharedSession = Arc<Session>;

pub fn router(session: SharedSession, api_key: ApiKey) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Read ─────────────────────────────────────────────────────────────
        .route("/health",                  get(dashboard::health))
        .route("/api/dashboard",           get(dashboard::get_dashboard))
        .route("/ws/dashboard",            get(dashboard::ws_dashboard))
        // ── Commands ─────────────────────────────────────────────────────────
        .route("/api/commands/start",      post(commands::start_bot))
        .route("/api/commands/stop",       post(commands::stop_bot))
        .route("/api/commands/squareoff",  post(commands::square_off))
        .route("/api/commands/mode",       post(commands::set_mode))
        .route("/api/commands/config",     post(commands::update_config))
        // ── Middleware ───────────────────────────────────────────────────────
        .layer(middleware::from_fn_with_state(api_key, require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(session)
}
