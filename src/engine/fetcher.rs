//! # engine::fetcher
//!
//! **Snapshot Fetcher**: reads the whole bot service in one concurrent batch
//! and hands the result to the store as a single atomic snapshot.
//!
//! All seven reads must succeed.  If any one fails the whole batch is thrown
//! away and the previous state stays on screen; the next poll tries again.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::api::BotApi;
use crate::error::SyncError;
use crate::state::{Snapshot, StateStore};

#[derive(Clone)]
pub struct SnapshotFetcher {
    api:         BotApi,
    store:       StateStore,
    trade_limit: u32,
    log_limit:   u32,
}

impl SnapshotFetcher {
    pub fn new(api: BotApi, store: StateStore, trade_limit: u32, log_limit: u32) -> Self {
        Self { api, store, trade_limit, log_limit }
    }

    /// Issue the full read batch concurrently.  Short-circuits on the first error.
    pub async fn fetch(&self) -> Result<Snapshot, SyncError> {
        let (status, market, position, trades, summary, logs, config) = tokio::try_join!(
            self.api.status(),
            self.api.market_tick(),
            self.api.position(),
            self.api.trades(self.trade_limit),
            self.api.summary(),
            self.api.logs(self.log_limit),
            self.api.config(),
        )?;

        Ok(Snapshot { status, market, position, trades, summary, config, logs })
    }

    /// Fetch and apply.  On error nothing is written.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        match self.fetch().await {
            Ok(snapshot) => {
                self.store.apply_snapshot(snapshot).await;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Snapshot fetch failed — keeping previous state");
                Err(err)
            }
        }
    }

    /// Poll forever.  The first tick fires immediately, so this also performs
    /// the startup fetch.
    pub async fn run_polling(self, period: Duration) {
        // `interval` panics on a zero period.
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.refresh().await.is_ok() {
                debug!("Poll cycle applied");
            }
        }
    }
}
