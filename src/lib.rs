//! # options-dashboard
//!
//! Keeps a local, always-current picture of a remote options-trading bot by
//! combining periodic full snapshots with a push channel of partial updates,
//! and relays operator commands back to the bot.
//!
//! ```text
//!   bot service ──REST──▶ SnapshotFetcher ─┐
//!        │                                 ├──▶ StateStore ──▶ /ws/dashboard
//!        └────WS────────▶ PushListener ────┘        ▲             /api/dashboard
//!        ▲                                          │
//!        └──────REST──── CommandDispatcher ─────────┘ (notification + re-fetch)
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod state;
