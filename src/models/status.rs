//! # models::status
//!
//! [`BotStatus`] as reported by `GET /api/status`, plus the small enums it is
//! built from.  The push channel only ever touches `is_running` and `mode`.

use serde::{Deserialize, Serialize};

// ─── Enums ────────────────────────────────────────────────────────────────────

/// Execution mode of the bot.  `Paper` simulates fills, `Live` sends real orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Live,
    Paper,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Live => "live",
            TradingMode::Paper => "paper",
        }
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(TradingMode::Live),
            "paper" => Ok(TradingMode::Paper),
            other => Err(format!("unknown mode '{other}', expected 'live' or 'paper'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    #[default]
    Closed,
}

/// Whether the bot service holds broker credentials and considers itself linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerConnection {
    Connected,
    #[default]
    Disconnected,
}

// ─── BotStatus ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BotStatus {
    pub is_running: bool,
    pub mode: TradingMode,
    pub market_status: MarketStatus,
    pub connection_status: BrokerConnection,
    pub daily_max_loss_triggered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_payload() {
        let status: BotStatus = serde_json::from_str(
            r#"{"is_running":true,"mode":"paper","market_status":"open",
                "connection_status":"connected","daily_max_loss_triggered":false}"#,
        )
        .unwrap();

        assert!(status.is_running);
        assert_eq!(status.mode, TradingMode::Paper);
        assert_eq!(status.market_status, MarketStatus::Open);
        assert_eq!(status.connection_status, BrokerConnection::Connected);
    }

    #[test]
    fn mode_from_str_is_case_insensitive() {
        assert_eq!("LIVE".parse::<TradingMode>(), Ok(TradingMode::Live));
        assert_eq!("paper".parse::<TradingMode>(), Ok(TradingMode::Paper));
        assert!("demo".parse::<TradingMode>().is_err());
    }
}
