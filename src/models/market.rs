//! # models::market
//!
//! Defines [`MarketTick`], the latest index quote together with the Supertrend
//! signal the bot trades on.
//!
//! A tick is never merged field by field: both the snapshot (`GET
//! /api/market/nifty`) and every push event rebuild it wholesale.

use serde::{Deserialize, Serialize};

/// Direction of the Supertrend indicator.  `null` on the wire until the bot has
/// seen enough candles to compute one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendSignal {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketTick {
    /// Last traded price of the underlying index.
    #[serde(alias = "ltp")]
    pub last_traded_price: f64,

    #[serde(default, alias = "supertrend_signal")]
    pub trend_signal: Option<TrendSignal>,

    #[serde(default, alias = "supertrend_value")]
    pub trend_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_wire_names() {
        let tick: MarketTick = serde_json::from_str(
            r#"{"ltp":24510.5,"supertrend_signal":"RED","supertrend_value":24600.0,
                "timestamp":"2025-01-01T09:30:00Z"}"#,
        )
        .unwrap();

        assert_eq!(tick.last_traded_price, 24510.5);
        assert_eq!(tick.trend_signal, Some(TrendSignal::Red));
        assert_eq!(tick.trend_value, 24600.0);
    }

    #[test]
    fn null_signal_is_none() {
        let tick: MarketTick =
            serde_json::from_str(r#"{"ltp":0.0,"supertrend_signal":null,"supertrend_value":0.0}"#)
                .unwrap();
        assert_eq!(tick.trend_signal, None);
    }
}
