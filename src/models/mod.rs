//! Domain models shared across the dashboard: what the bot service reports and
//! what the push channel delivers.

pub mod config;
pub mod market;
pub mod position;
pub mod push;
pub mod status;
pub mod summary;
pub mod trade;

pub use config::{BotConfig, ConfigUpdate};
pub use market::{MarketTick, TrendSignal};
pub use position::{OpenPosition, OptionType, Position};
pub use push::{PushMessage, StateUpdate};
pub use status::{BotStatus, BrokerConnection, MarketStatus, TradingMode};
pub use summary::Summary;
pub use trade::{LogEntry, Trade};
