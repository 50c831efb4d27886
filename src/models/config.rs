//! # models::config
//!
//! Bot risk configuration.
//!
//! * [`BotConfig`]: what `GET /api/config` returns.  Credentials are never
//!   echoed back; only `has_credentials` tells whether they are set.
//! * [`ConfigUpdate`]: the partial body for `POST /api/config/update`.  Every
//!   field is optional and omitted from the JSON when `None`.

use serde::{Deserialize, Serialize};

use crate::models::TradingMode;

// ─── BotConfig ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Contracts per order.  Also the multiplier for unrealized P&L.
    #[serde(alias = "order_qty")]
    pub order_quantity: u32,
    pub max_trades_per_day: u32,
    pub daily_max_loss: f64,
    pub trail_start_profit: f64,
    pub trail_step: f64,
    #[serde(alias = "trailing_sl_distance")]
    pub trailing_stop_distance: f64,
    #[serde(default)]
    pub has_credentials: bool,
    #[serde(default)]
    pub mode: TradingMode,
}

impl Default for BotConfig {
    /// Same defaults the bot service boots with.
    fn default() -> Self {
        Self {
            order_quantity: 50,
            max_trades_per_day: 5,
            daily_max_loss: 2000.0,
            trail_start_profit: 10.0,
            trail_step: 5.0,
            trailing_stop_distance: 10.0,
            has_credentials: false,
            mode: TradingMode::Live,
        }
    }
}

// ─── ConfigUpdate ─────────────────────────────────────────────────────────────

/// Partial config write.  Field names follow the service's request schema.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(rename = "dhan_client_id", alias = "client_id", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(rename = "dhan_access_token", alias = "access_token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "order_qty", alias = "order_quantity", default, skip_serializing_if = "Option::is_none")]
    pub order_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trades_per_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_max_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_start_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_step: Option<f64>,
    #[serde(rename = "trailing_sl_distance", alias = "trailing_stop_distance", default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_distance: Option<f64>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }

    pub fn touches_credentials(&self) -> bool {
        self.client_id.is_some() || self.access_token.is_some()
    }
}

// Credentials are write-only: they must never reach a log line.
impl std::fmt::Debug for ConfigUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ConfigUpdate")
            .field("client_id", &redact(&self.client_id))
            .field("access_token", &redact(&self.access_token))
            .field("order_quantity", &self.order_quantity)
            .field("max_trades_per_day", &self.max_trades_per_day)
            .field("daily_max_loss", &self.daily_max_loss)
            .field("trail_start_profit", &self.trail_start_profit)
            .field("trail_step", &self.trail_step)
            .field("trailing_stop_distance", &self.trailing_stop_distance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_config() {
        let config: BotConfig = serde_json::from_str(
            r#"{"order_qty":75,"max_trades_per_day":3,"daily_max_loss":1500,
                "trail_start_profit":10,"trail_step":5,"trailing_sl_distance":8,
                "has_credentials":true,"mode":"paper"}"#,
        )
        .unwrap();

        assert_eq!(config.order_quantity, 75);
        assert_eq!(config.trailing_stop_distance, 8.0);
        assert!(config.has_credentials);
        assert_eq!(config.mode, TradingMode::Paper);
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = ConfigUpdate {
            order_quantity: Some(25),
            trailing_stop_distance: Some(12.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "order_qty": 25, "trailing_sl_distance": 12.5 }));
    }

    #[test]
    fn debug_redacts_credentials() {
        let update = ConfigUpdate {
            client_id: Some("1100".into()),
            access_token: Some("secret-token".into()),
            ..Default::default()
        };
        let rendered = format!("{update:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("1100"));
        assert!(update.touches_credentials());
    }
}
