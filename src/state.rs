//! # state
//!
//! The dashboard's **single source of truth**.  The Snapshot Fetcher and the
//! Push Listener both write through [`StateStore`]; renderers only read.
//!
//! ## Consistency
//!
//! * Every apply runs inside one `RwLock` write section, so a reader sees either
//!   the whole snapshot or none of it: never trades from one fetch and a
//!   position from another.
//! * There are no sequence numbers.  When a poll and a push race, whichever
//!   write lands second wins.
//! * Every apply publishes a [`DashboardEvent::StateChanged`] on the broadcast
//!   channel so WebSocket renderers can redraw.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::engine::merge;
use crate::events::{DashboardEvent, UpdateSource};
use crate::models::{
    BotConfig, BotStatus, LogEntry, MarketTick, Position, StateUpdate, Summary, Trade,
};

/// Capacity of the event channel; slow subscribers skip events beyond this.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ─── DashboardState ───────────────────────────────────────────────────────────

/// Everything the renderer draws, minus the push connection state (owned by
/// the listener).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardState {
    pub status:   BotStatus,
    pub market:   MarketTick,
    pub position: Position,
    pub trades:   Vec<Trade>,
    pub summary:  Summary,
    pub config:   BotConfig,
    pub logs:     Vec<LogEntry>,

    pub last_snapshot_at: Option<DateTime<Utc>>,
    pub last_push_at:     Option<DateTime<Utc>>,
}

/// One complete read of the bot service, as assembled by the fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub status:   BotStatus,
    pub market:   MarketTick,
    pub position: Position,
    pub trades:   Vec<Trade>,
    pub summary:  Summary,
    pub config:   BotConfig,
    pub logs:     Vec<LogEntry>,
}

// ─── StateStore ───────────────────────────────────────────────────────────────

/// Cheap to clone; all clones share the same state and event channel.
#[derive(Clone)]
pub struct StateStore {
    inner:  Arc<RwLock<DashboardState>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(DashboardState::default())
    }

    pub fn with_state(state: DashboardState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(state)),
            events,
        }
    }

    /// Replace every entity with the snapshot's values in one step.
    pub async fn apply_snapshot(&self, snapshot: Snapshot) {
        let published = {
            let mut guard = self.inner.write().await;
            merge::apply_snapshot(&mut guard, snapshot);
            guard.last_snapshot_at = Some(Utc::now());
            guard.clone()
        };

        debug!(position_open = published.position.is_open(), "Snapshot applied");
        self.publish(DashboardEvent::StateChanged {
            source: UpdateSource::Snapshot,
            state:  Box::new(published),
        });
    }

    /// Merge one push event according to the push policy.
    pub async fn apply_push(&self, update: &StateUpdate) {
        let published = {
            let mut guard = self.inner.write().await;
            merge::apply_push(&mut guard, update);
            guard.last_push_at = Some(Utc::now());
            guard.clone()
        };

        self.publish(DashboardEvent::StateChanged {
            source: UpdateSource::Push,
            state:  Box::new(published),
        });
    }

    /// Clone of the current state (lock released before returning).
    pub async fn read(&self) -> DashboardState {
        self.inner.read().await.clone()
    }

    /// Broadcast an event to every renderer.  No subscribers is not an error.
    pub fn publish(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
