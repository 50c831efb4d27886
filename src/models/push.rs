//! # models::push
//!
//! Inbound messages on the push channel.
//!
//! Every frame is a self-describing envelope `{ "type": ..., "data": ... }`.
//! Only `state_update` carries state; `heartbeat` is keep-alive noise from the
//! service and anything else is unknown to this dashboard version.
//!
//! ```json
//! { "type": "state_update",
//!   "data": { "is_running": true, "mode": "paper", "nifty_ltp": 24500.25,
//!             "supertrend_signal": "GREEN", "supertrend_value": 24410.0,
//!             "daily_trades": 2, "daily_pnl": 150.5,
//!             "position": { "option_type": "CE", "strike": 24500, "expiry": "2025-01-02" },
//!             "entry_price": 120.0, "current_option_ltp": 135.0, "trailing_sl": null } }
//! ```
//!
//! Position prices may arrive nested inside `position` or at the top level of
//! `data`; nested values win.  A missing or `null` `position` means flat.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::SyncError;
use crate::models::{MarketTick, OpenPosition, OptionType, Position, TradingMode, TrendSignal};

// ─── Envelope ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// A decoded push frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    StateUpdate(Box<StateUpdate>),
    Heartbeat,
    /// Well-formed envelope with a type this dashboard does not handle.
    Unknown(String),
}

impl PushMessage {
    /// Decode one text frame.  Fails on invalid JSON, on an envelope without
    /// `type`, or on a `state_update` whose payload does not match the schema.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let envelope: PushEnvelope = serde_json::from_str(text)?;

        match envelope.kind.as_str() {
            "state_update" => {
                let update: StateUpdate = serde_json::from_value(envelope.data)?;
                if update.position.is_some() && update.resolved_entry_price().is_none() {
                    return Err(SyncError::Decode(serde::de::Error::custom(
                        "state_update position has no entry_price",
                    )));
                }
                Ok(PushMessage::StateUpdate(Box::new(update)))
            }
            "heartbeat" => Ok(PushMessage::Heartbeat),
            _ => Ok(PushMessage::Unknown(envelope.kind)),
        }
    }
}

// ─── StateUpdate ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateUpdate {
    pub is_running: bool,
    pub mode: TradingMode,
    pub nifty_ltp: f64,
    #[serde(default)]
    pub supertrend_signal: Option<TrendSignal>,
    #[serde(default)]
    pub supertrend_value: Option<f64>,
    pub daily_trades: u32,
    pub daily_pnl: f64,
    #[serde(default)]
    pub position: Option<PushPosition>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub current_option_ltp: Option<f64>,
    #[serde(default)]
    pub trailing_sl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushPosition {
    pub option_type: OptionType,
    pub strike: f64,
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default, alias = "current_ltp")]
    pub current_option_ltp: Option<f64>,
    #[serde(default)]
    pub trailing_sl: Option<f64>,
}

impl StateUpdate {
    /// The tick carried by this event.  Missing indicator fields reset to their
    /// empty values: a tick is always rebuilt, never patched.
    pub fn market_tick(&self) -> MarketTick {
        MarketTick {
            last_traded_price: self.nifty_ltp,
            trend_signal: self.supertrend_signal,
            trend_value: self.supertrend_value.unwrap_or_default(),
        }
    }

    /// Entry price of the carried position, nested value first.
    fn resolved_entry_price(&self) -> Option<f64> {
        self.position
            .as_ref()
            .and_then(|pos| pos.entry_price)
            .or(self.entry_price)
    }

    /// The position described by this event, priced with `order_quantity`.
    /// `parse` rejects a position without an entry price, so one never reaches here.
    pub fn position(&self, order_quantity: u32) -> Position {
        let (Some(pos), Some(entry_price)) = (&self.position, self.resolved_entry_price()) else {
            return Position::Flat;
        };

        let current_price = pos
            .current_option_ltp
            .or(self.current_option_ltp)
            .unwrap_or(entry_price);

        Position::Open(OpenPosition::new(
            pos.option_type,
            pos.strike,
            pos.expiry,
            entry_price,
            current_price,
            pos.trailing_sl.or(self.trailing_sl),
            order_quantity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_update(text: &str) -> StateUpdate {
        match PushMessage::parse(text).unwrap() {
            PushMessage::StateUpdate(update) => *update,
            other => panic!("expected state_update, got {other:?}"),
        }
    }

    #[test]
    fn nested_position_prices() {
        let update = parse_update(
            r#"{"type":"state_update","data":{"nifty_ltp":24500.25,"supertrend_signal":"GREEN",
                "is_running":true,"mode":"paper","daily_trades":2,"daily_pnl":150.5,
                "position":{"option_type":"CE","strike":24500,"entry_price":120,"current_option_ltp":135}}}"#,
        );

        let open = update.position(50);
        let open = open.as_open().unwrap();
        assert_eq!(open.unrealized_pnl, 750.0);
        assert_eq!(update.market_tick().last_traded_price, 24500.25);
        assert_eq!(update.market_tick().trend_value, 0.0);
    }

    #[test]
    fn top_level_position_prices() {
        let update = parse_update(
            r#"{"type":"state_update","data":{"nifty_ltp":24480.0,"supertrend_signal":"RED",
                "supertrend_value":24550.0,"is_running":true,"mode":"live","daily_trades":1,
                "daily_pnl":0.0,"timestamp":"2025-01-02T04:00:00+00:00",
                "position":{"trade_id":"T1","option_type":"PE","strike":24500,"expiry":"2025-01-02",
                            "security_id":"SIM_24500_PE","entry_time":"2025-01-02T03:59:00+00:00"},
                "entry_price":100.0,"current_option_ltp":104.0,"trailing_sl":95.0}}"#,
        );

        let position = update.position(25);
        let open = position.as_open().unwrap();
        assert_eq!(open.entry_price, 100.0);
        assert_eq!(open.current_price, 104.0);
        assert_eq!(open.trailing_stop, Some(95.0));
        assert_eq!(open.unrealized_pnl, 100.0);
    }

    #[test]
    fn null_position_is_flat() {
        let update = parse_update(
            r#"{"type":"state_update","data":{"nifty_ltp":1.0,"is_running":false,"mode":"live",
                "daily_trades":0,"daily_pnl":0.0,"position":null}}"#,
        );
        assert_eq!(update.position(50), Position::Flat);
    }

    #[test]
    fn heartbeat_and_unknown_types() {
        assert_eq!(
            PushMessage::parse(r#"{"type":"heartbeat","timestamp":"2025-01-02T04:00:00Z"}"#).unwrap(),
            PushMessage::Heartbeat
        );
        assert_eq!(
            PushMessage::parse(r#"{"type":"order_fill","data":{}}"#).unwrap(),
            PushMessage::Unknown("order_fill".into())
        );
    }

    #[test]
    fn malformed_frames_fail() {
        assert!(PushMessage::parse("pong").is_err());
        assert!(PushMessage::parse(r#"{"data":{}}"#).is_err());
        assert!(PushMessage::parse(r#"{"type":"state_update","data":{"mode":"live"}}"#).is_err());
    }

    #[test]
    fn position_without_entry_price_is_malformed() {
        let err = PushMessage::parse(
            r#"{"type":"state_update","data":{"nifty_ltp":24500.0,"is_running":true,
                "mode":"live","daily_trades":1,"daily_pnl":0.0,
                "position":{"option_type":"CE","strike":24500},"current_option_ltp":135.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
        assert!(err.to_string().contains("entry_price"));
    }
}
