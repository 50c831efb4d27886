//! # engine::merge
//!
//! **State Merger**: how snapshots and push events land in [`DashboardState`].
//!
//! Snapshots are authoritative and replace everything.  Push events are
//! partial, and exactly which fields they may touch is declared once in
//! [`PUSH_POLICY`]:
//!
//! ```text
//! Entity       Push rule
//! ──────────   ─────────────────────────────────────────────
//! BotStatus    overlay  is_running, mode
//! MarketTick   replace
//! Position     replace  (flat when the event has no position)
//! Trades       retain
//! Summary      overlay  total_trades, total_pnl
//! Config       retain
//! Logs         retain
//! ```
//!
//! `unrealized_pnl` is derived on every write from the position prices and the
//! order quantity currently held in `Config`.

use serde::Serialize;
use tracing::warn;

use crate::models::StateUpdate;
use crate::state::{DashboardState, Snapshot};

// ─── Policy table ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    BotStatus,
    MarketTick,
    Position,
    Trades,
    Summary,
    Config,
    Logs,
}

impl Entity {
    pub const ALL: [Entity; 7] = [
        Entity::BotStatus,
        Entity::MarketTick,
        Entity::Position,
        Entity::Trades,
        Entity::Summary,
        Entity::Config,
        Entity::Logs,
    ];
}

/// A single field a push event is allowed to overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    IsRunning,
    Mode,
    TotalTrades,
    TotalPnl,
}

impl Field {
    pub fn entity(self) -> Entity {
        match self {
            Field::IsRunning | Field::Mode => Entity::BotStatus,
            Field::TotalTrades | Field::TotalPnl => Entity::Summary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRule {
    /// Entity rebuilt wholesale from the event.
    Replace,
    /// Only the listed fields are taken from the event.
    Overlay(&'static [Field]),
    /// Push events never touch the entity.
    Retain,
}

pub const PUSH_POLICY: [(Entity, PushRule); 7] = [
    (Entity::BotStatus,  PushRule::Overlay(&[Field::IsRunning, Field::Mode])),
    (Entity::MarketTick, PushRule::Replace),
    (Entity::Position,   PushRule::Replace),
    (Entity::Trades,     PushRule::Retain),
    (Entity::Summary,    PushRule::Overlay(&[Field::TotalTrades, Field::TotalPnl])),
    (Entity::Config,     PushRule::Retain),
    (Entity::Logs,       PushRule::Retain),
];

pub fn push_rule(entity: Entity) -> PushRule {
    PUSH_POLICY
        .iter()
        .find(|(e, _)| *e == entity)
        .map(|(_, rule)| *rule)
        .unwrap_or(PushRule::Retain)
}

// ─── Apply ────────────────────────────────────────────────────────────────────

/// Total replacement.  The position is repriced against the snapshot's own
/// order quantity; any P&L the service sent is ignored.
pub fn apply_snapshot(state: &mut DashboardState, snapshot: Snapshot) {
    let Snapshot { status, market, mut position, trades, summary, config, logs } = snapshot;

    position.reprice(config.order_quantity);

    state.status = status;
    state.market = market;
    state.position = position;
    state.trades = trades;
    state.summary = summary;
    state.config = config;
    state.logs = logs;
}

/// Partial merge driven by [`PUSH_POLICY`].
pub fn apply_push(state: &mut DashboardState, update: &StateUpdate) {
    for (entity, rule) in PUSH_POLICY {
        match rule {
            PushRule::Replace => replace_entity(state, entity, update),
            PushRule::Overlay(fields) => {
                for field in fields {
                    overlay_field(state, *field, update);
                }
            }
            PushRule::Retain => {}
        }
    }
}

fn replace_entity(state: &mut DashboardState, entity: Entity, update: &StateUpdate) {
    match entity {
        Entity::MarketTick => state.market = update.market_tick(),
        Entity::Position => state.position = update.position(state.config.order_quantity),
        other => warn!(entity = ?other, "Push events cannot rebuild this entity — left as is"),
    }
}

fn overlay_field(state: &mut DashboardState, field: Field, update: &StateUpdate) {
    match field {
        Field::IsRunning => state.status.is_running = update.is_running,
        Field::Mode => state.status.mode = update.mode,
        Field::TotalTrades => state.summary.total_trades = update.daily_trades,
        Field::TotalPnl => state.summary.total_pnl = update.daily_pnl,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BotConfig, BotStatus, BrokerConnection, LogEntry, MarketStatus, MarketTick, OpenPosition,
        OptionType, Position, PushMessage, Summary, Trade, TradingMode, TrendSignal,
    };

    fn push(text: &str) -> StateUpdate {
        match PushMessage::parse(text).unwrap() {
            PushMessage::StateUpdate(update) => *update,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn scenario_push() -> StateUpdate {
        push(
            r#"{"type":"state_update","data":{"nifty_ltp":24500.25,"supertrend_signal":"GREEN",
                "is_running":true,"mode":"paper","daily_trades":2,"daily_pnl":150.5,
                "position":{"option_type":"CE","strike":24500,"entry_price":120,"current_option_ltp":135}}}"#,
        )
    }

    fn flat_push() -> StateUpdate {
        push(
            r#"{"type":"state_update","data":{"nifty_ltp":24470.0,"supertrend_signal":"RED",
                "supertrend_value":24520.0,"is_running":false,"mode":"live",
                "daily_trades":3,"daily_pnl":90.0}}"#,
        )
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            status: BotStatus {
                is_running: false,
                mode: TradingMode::Live,
                market_status: MarketStatus::Open,
                connection_status: BrokerConnection::Connected,
                daily_max_loss_triggered: true,
            },
            market: MarketTick {
                last_traded_price: 24300.0,
                trend_signal: Some(TrendSignal::Red),
                trend_value: 24350.0,
            },
            position: Position::Open(OpenPosition {
                option_type: OptionType::Pe,
                strike: 24300.0,
                expiry: None,
                entry_price: 80.0,
                current_price: 82.0,
                trailing_stop: None,
                unrealized_pnl: 12345.0,
            }),
            trades: vec![Trade {
                trade_id: "T1".into(),
                entry_time: None,
                exit_time: None,
                option_type: Some(OptionType::Pe),
                strike: Some(24300.0),
                expiry: None,
                entry_price: Some(80.0),
                exit_price: None,
                qty: Some(50),
                pnl: None,
                exit_reason: None,
                mode: Some(TradingMode::Live),
                created_at: None,
            }],
            summary: Summary {
                total_trades: 1,
                total_pnl: -40.0,
                max_drawdown: 60.0,
                daily_stop_triggered: true,
            },
            config: BotConfig { order_quantity: 50, ..BotConfig::default() },
            logs: vec![LogEntry {
                timestamp: "2025-01-02 09:30:00,000".into(),
                level: "INFO".into(),
                message: "Trading bot started".into(),
            }],
        }
    }

    #[test]
    fn policy_covers_every_entity_once() {
        for entity in Entity::ALL {
            let count = PUSH_POLICY.iter().filter(|(e, _)| *e == entity).count();
            assert_eq!(count, 1, "{entity:?} must appear exactly once");
        }
    }

    #[test]
    fn overlay_fields_belong_to_their_entity() {
        for (entity, rule) in PUSH_POLICY {
            if let PushRule::Overlay(fields) = rule {
                assert!(!fields.is_empty());
                for field in fields {
                    assert_eq!(field.entity(), entity);
                }
            }
        }
    }

    #[test]
    fn policy_matches_documented_table() {
        assert_eq!(push_rule(Entity::MarketTick), PushRule::Replace);
        assert_eq!(push_rule(Entity::Position), PushRule::Replace);
        assert_eq!(
            push_rule(Entity::BotStatus),
            PushRule::Overlay(&[Field::IsRunning, Field::Mode])
        );
        assert_eq!(
            push_rule(Entity::Summary),
            PushRule::Overlay(&[Field::TotalTrades, Field::TotalPnl])
        );
        for entity in [Entity::Trades, Entity::Config, Entity::Logs] {
            assert_eq!(push_rule(entity), PushRule::Retain);
        }
    }

    #[test]
    fn snapshot_reprices_position() {
        let mut state = DashboardState::default();
        apply_snapshot(&mut state, sample_snapshot());

        let open = state.position.as_open().unwrap();
        assert_eq!(open.unrealized_pnl, 100.0);
        assert_eq!(state.trades.len(), 1);
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn push_preserves_unnamed_status_and_summary_fields() {
        let mut state = DashboardState::default();
        apply_snapshot(&mut state, sample_snapshot());
        let snap = state.clone();

        apply_push(&mut state, &scenario_push());

        assert!(state.status.is_running);
        assert_eq!(state.status.mode, TradingMode::Paper);
        assert_eq!(state.status.market_status, snap.status.market_status);
        assert_eq!(state.status.connection_status, snap.status.connection_status);
        assert_eq!(state.status.daily_max_loss_triggered, snap.status.daily_max_loss_triggered);

        assert_eq!(state.summary.total_trades, 2);
        assert_eq!(state.summary.total_pnl, 150.5);
        assert_eq!(state.summary.max_drawdown, snap.summary.max_drawdown);
        assert_eq!(state.summary.daily_stop_triggered, snap.summary.daily_stop_triggered);

        assert_eq!(state.trades, snap.trades);
        assert_eq!(state.config, snap.config);
        assert_eq!(state.logs, snap.logs);
    }

    #[test]
    fn scenario_push_derives_pnl() {
        let mut state = DashboardState::default();
        state.config.order_quantity = 50;

        apply_push(&mut state, &scenario_push());

        let open = state.position.as_open().unwrap();
        assert_eq!(open.option_type, OptionType::Ce);
        assert_eq!(open.unrealized_pnl, 750.0);
        assert_eq!(state.market.last_traded_price, 24500.25);
        assert_eq!(state.market.trend_signal, Some(TrendSignal::Green));
    }

    #[test]
    fn same_push_twice_is_idempotent() {
        let mut state = DashboardState::default();
        apply_push(&mut state, &scenario_push());
        let once = state.clone();
        apply_push(&mut state, &scenario_push());
        assert_eq!(state, once);
    }

    #[test]
    fn push_without_position_goes_flat() {
        let mut state = DashboardState::default();
        apply_push(&mut state, &scenario_push());
        assert!(state.position.is_open());

        apply_push(&mut state, &flat_push());

        assert_eq!(state.position, Position::Flat);
        assert_eq!(state.market.last_traded_price, 24470.0);
        assert_eq!(state.market.trend_signal, Some(TrendSignal::Red));
        assert_eq!(state.market.trend_value, 24520.0);
        assert!(!state.status.is_running);
        assert_eq!(state.status.mode, TradingMode::Live);
        assert_eq!(state.summary.total_trades, 3);
    }

    #[test]
    fn push_without_position_clears_snapshot_position() {
        let mut state = DashboardState::default();
        apply_snapshot(&mut state, sample_snapshot());
        assert!(state.position.is_open());

        apply_push(&mut state, &flat_push());
        assert_eq!(state.position, Position::Flat);
    }

    #[test]
    fn pnl_tracks_current_order_quantity() {
        let mut state = DashboardState::default();
        state.config.order_quantity = 75;
        apply_push(&mut state, &scenario_push());
        assert_eq!(state.position.as_open().unwrap().unrealized_pnl, 1125.0);
    }

    #[test]
    fn later_write_wins() {
        let mut state = DashboardState::default();
        apply_push(&mut state, &scenario_push());
        apply_snapshot(&mut state, sample_snapshot());
        assert_eq!(state.market.last_traded_price, 24300.0);
        assert!(!state.status.is_running);

        apply_push(&mut state, &scenario_push());
        assert_eq!(state.market.last_traded_price, 24500.25);
        assert!(state.status.is_running);
    }
}
