//! # models::position
//!
//! The bot holds **at most one** option position at a time, so the dashboard
//! models it as a two-state union rather than a list.
//!
//! On the wire the union is flattened behind a `has_position` flag:
//!
//! ```json
//! { "has_position": false }
//! { "has_position": true, "option_type": "CE", "strike": 24500, "expiry": "2025-01-02",
//!   "entry_price": 120.0, "current_ltp": 135.0, "trailing_sl": null, "unrealized_pnl": 750.0 }
//! ```
//!
//! `unrealized_pnl` is a derived field.  Whatever value the service sends is
//! discarded and recomputed by [`Position::reprice`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── OptionType ───────────────────────────────────────────────────────────────

/// Call (`CE`) or put (`PE`), using the exchange's naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Ce,
    Pe,
}

// ─── Position ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PositionWire", into = "PositionWire")]
pub enum Position {
    #[default]
    Flat,
    Open(OpenPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub option_type: OptionType,
    pub strike: f64,
    pub expiry: Option<NaiveDate>,
    pub entry_price: f64,
    pub current_price: f64,
    pub trailing_stop: Option<f64>,
    pub unrealized_pnl: f64,
}

/// `(current − entry) × quantity`.
#[inline]
pub fn unrealized_pnl(entry_price: f64, current_price: f64, order_quantity: u32) -> f64 {
    (current_price - entry_price) * f64::from(order_quantity)
}

impl OpenPosition {
    /// Builds an open position with its P&L already derived.
    pub fn new(
        option_type: OptionType,
        strike: f64,
        expiry: Option<NaiveDate>,
        entry_price: f64,
        current_price: f64,
        trailing_stop: Option<f64>,
        order_quantity: u32,
    ) -> Self {
        Self {
            option_type,
            strike,
            expiry,
            entry_price,
            current_price,
            trailing_stop,
            unrealized_pnl: unrealized_pnl(entry_price, current_price, order_quantity),
        }
    }
}

impl Position {
    pub fn is_open(&self) -> bool {
        matches!(self, Position::Open(_))
    }

    pub fn as_open(&self) -> Option<&OpenPosition> {
        match self {
            Position::Open(open) => Some(open),
            Position::Flat => None,
        }
    }

    /// Recompute the derived P&L for the given order quantity.  No-op when flat.
    pub fn reprice(&mut self, order_quantity: u32) {
        if let Position::Open(open) = self {
            open.unrealized_pnl = unrealized_pnl(open.entry_price, open.current_price, order_quantity);
        }
    }
}

// ─── Wire form ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PositionWire {
    has_position: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    option_type: Option<OptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strike: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entry_price: Option<f64>,
    #[serde(default, alias = "current_ltp", skip_serializing_if = "Option::is_none")]
    current_price: Option<f64>,
    #[serde(default, alias = "trailing_sl", skip_serializing_if = "Option::is_none")]
    trailing_stop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unrealized_pnl: Option<f64>,
}

impl TryFrom<PositionWire> for Position {
    type Error = String;

    fn try_from(wire: PositionWire) -> Result<Self, Self::Error> {
        if !wire.has_position {
            return Ok(Position::Flat);
        }

        let option_type = wire.option_type.ok_or("open position without option_type")?;
        let strike = wire.strike.ok_or("open position without strike")?;
        let entry_price = wire.entry_price.ok_or("open position without entry_price")?;

        Ok(Position::Open(OpenPosition {
            option_type,
            strike,
            expiry: wire.expiry,
            entry_price,
            current_price: wire.current_price.unwrap_or(entry_price),
            trailing_stop: wire.trailing_stop,
            // Placeholder until the store reprices with the current order quantity.
            unrealized_pnl: 0.0,
        }))
    }
}

impl From<Position> for PositionWire {
    fn from(position: Position) -> Self {
        match position {
            Position::Flat => PositionWire {
                has_position: false,
                option_type: None,
                strike: None,
                expiry: None,
                entry_price: None,
                current_price: None,
                trailing_stop: None,
                unrealized_pnl: None,
            },
            Position::Open(open) => PositionWire {
                has_position: true,
                option_type: Some(open.option_type),
                strike: Some(open.strike),
                expiry: open.expiry,
                entry_price: Some(open.entry_price),
                current_price: Some(open.current_price),
                trailing_stop: open.trailing_stop,
                unrealized_pnl: Some(open.unrealized_pnl),
            },
        }
    }
}
