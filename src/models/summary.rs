//! # models::summary
//!
//! Daily roll-up from `GET /api/summary`.  Push events carry only the trade
//! count and running P&L; drawdown and the stop flag come from snapshots.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: u32,
    pub total_pnl: f64,
    pub max_drawdown: f64,
    pub daily_stop_triggered: bool,
}
