//! # models::trade
//!
//! Historical records served by the bot: closed/open trades from
//! `GET /api/trades` and recent log lines from `GET /api/logs`.
//!
//! Both are read-only from the dashboard's point of view.  The service already
//! bounds them with the `limit` query parameter, so no client-side cap is applied.

use serde::{Deserialize, Serialize};

use crate::models::{OptionType, TradingMode};

/// One row of the bot's trade journal.  Exit fields stay `None` while the
/// trade is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    #[serde(default)]
    pub entry_time: Option<String>,
    #[serde(default)]
    pub exit_time: Option<String>,
    #[serde(default)]
    pub option_type: Option<OptionType>,
    #[serde(default)]
    pub strike: Option<f64>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub exit_reason: Option<String>,
    #[serde(default)]
    pub mode: Option<TradingMode>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A parsed line of the bot log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}
