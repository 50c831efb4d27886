//! # options-dashboard: binary entry point
//!
//! Boots the sync session against the bot service and serves the local
//! dashboard surface.  See [`options_dashboard::config`] for environment
//! variables; `RUST_LOG` refines the tracing filter.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use options_dashboard::{auth::ApiKey, config::Config, engine::Session, routes};

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional: CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("options_dashboard=debug".parse()?)
            .add_directive("tower_http=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        OPTIONS DASHBOARD — State Sync         ║
  ║        Snapshot  ·  Push  ·  Commands         ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Configuration ─────────────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(
        api = %config.api_url,
        push = %config.ws_url,
        poll_secs = config.poll_interval.as_secs(),
        auth = config.dashboard_api_key.is_some(),
        "Configuration loaded"
    );

    // ── 4. Start the sync session ────────────────────────────────────────────
    let session = Arc::new(Session::from_config(&config));
    session.start();

    // ── 5. Router ────────────────────────────────────────────────────────────
    let app = routes::router(
        Arc::clone(&session),
        ApiKey::new(config.dashboard_api_key.clone()),
    );

    // ── 6. Serve until Ctrl-C ────────────────────────────────────────────────
    info!(addr = ?config.bind_addr, "🚀 Dashboard server starting");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Ctrl-C received — shutting down");
        })
        .await?;

    session.shutdown().await;
    Ok(())
}
