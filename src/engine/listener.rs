//! # engine::listener
//!
//! **Push Listener**: owns the one live push connection and keeps it alive.
//!
//! ```text
//!            connect()                 stream ends / connect fails
//!  CONNECTING ─────────▶ OPEN ─────────────────────────────────────▶ CLOSED
//!      ▲                                                              │
//!      └──────────── reconnect timer (fixed delay) ◀──────────────────┘
//! ```
//!
//! * **Connect guard**: [`PushListener::connect`] is a no-op while the
//!   connection is OPEN or an attempt is still in flight, so two connections
//!   never coexist.
//! * **Messages**: each frame is decoded as a [`PushMessage`]; `state_update`
//!   goes to the store, heartbeats are ignored, anything unknown or malformed is
//!   logged and dropped.  A bad frame never closes the connection.
//! * **Errors**: transport errors are logged only.  The close that follows is
//!   what moves the machine to CLOSED and arms the reconnect timer.
//! * **Teardown**: [`PushListener::close`] aborts the connection task and any
//!   pending timer.  Nothing fires afterwards.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::events::DashboardEvent;
use crate::models::PushMessage;
use crate::state::StateStore;

// ─── Transport seam ───────────────────────────────────────────────────────────

/// What a live connection yields.  The end of the stream is the close event.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Message(String),
    Error(String),
}

/// Dials the push channel.  Production uses [`super::transport::WsConnector`].
pub trait Connector: Send + Sync + 'static {
    fn connect(
        &self,
    ) -> impl Future<Output = Result<BoxStream<'static, TransportEvent>, SyncError>> + Send;
}

// ─── ConnectionState ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

// ─── PushListener ─────────────────────────────────────────────────────────────

pub struct PushListener<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for PushListener<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct Inner<C> {
    connector:       C,
    store:           StateStore,
    reconnect_delay: Duration,
    state_tx:        watch::Sender<ConnectionState>,
    tasks:           Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    connection: Option<JoinHandle<()>>,
    reconnect:  Option<JoinHandle<()>>,
    /// A connection task is dialling or reading.
    in_flight:  bool,
    /// `close()` was called; no further attempts.
    shut_down:  bool,
}

impl<C: Connector> PushListener<C> {
    pub fn new(connector: C, store: StateStore, reconnect_delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        Self {
            inner: Arc::new(Inner {
                connector,
                store,
                reconnect_delay,
                state_tx,
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    /// Start a connection attempt.  Returns `false` when the guard skipped it.
    pub fn connect(&self) -> bool {
        self.inner.connect()
    }

    /// Tear down: cancel any pending reconnect, drop the live connection.
    ///
    /// Returns once both tasks have stopped; no state change or store write
    /// from this listener happens afterwards.
    pub async fn close(&self) {
        let (connection, reconnect) = {
            let mut tasks = self.inner.tasks();
            tasks.shut_down = true;
            tasks.in_flight = false;
            (tasks.connection.take(), tasks.reconnect.take())
        };

        for handle in [reconnect, connection].into_iter().flatten() {
            // Abort lands at the task's next yield point.
            handle.abort();
            let _ = handle.await;
        }
        self.inner.set_state(ConnectionState::Closed);
        info!("🔌 Push listener closed");
    }

    pub fn status(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// A reconnect timer is armed and has not fired yet.
    pub fn reconnect_pending(&self) -> bool {
        self.inner
            .tasks()
            .reconnect
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<C: Connector> Inner<C> {
    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        // Critical sections never panic; a poisoned lock still holds valid data.
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_shut_down(&self) -> bool {
        self.tasks().shut_down
    }

    /// OPEN entry.  Refused once `close()` has begun.
    fn mark_open(&self) -> bool {
        let tasks = self.tasks();
        if tasks.shut_down {
            return false;
        }
        self.set_state(ConnectionState::Open);
        true
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            debug!(from = ?previous, to = ?next, "Push connection state");
            self.store.publish(DashboardEvent::ConnectionChanged { state: next });
        }
    }

    fn connect(self: &Arc<Self>) -> bool {
        let mut tasks = self.tasks();

        if tasks.shut_down {
            debug!("Listener closed — connect ignored");
            return false;
        }
        if *self.state_tx.borrow() == ConnectionState::Open || tasks.in_flight {
            debug!("Connection already live — connect attempt is a no-op");
            return false;
        }

        tasks.in_flight = true;
        self.set_state(ConnectionState::Connecting);

        let inner = Arc::clone(self);
        tasks.connection = Some(tokio::spawn(async move {
            inner.run_connection().await;
        }));
        true
    }

    async fn run_connection(self: Arc<Self>) {
        match self.connector.connect().await {
            Ok(mut stream) => {
                if !self.mark_open() {
                    debug!("Listener closed while dialling; connection discarded");
                    return;
                }
                info!("🔌 Push channel open");

                while let Some(event) = stream.next().await {
                    if self.is_shut_down() {
                        return;
                    }
                    match event {
                        TransportEvent::Message(text) => self.handle_message(&text).await,
                        TransportEvent::Error(err) => {
                            warn!(error = %err, "Push transport error");
                        }
                    }
                }

                info!("🔌 Push channel closed by peer");
            }
            Err(err) => {
                warn!(error = %err, "Push connect failed");
            }
        }

        self.on_close();
    }

    async fn handle_message(&self, text: &str) {
        match PushMessage::parse(text) {
            Ok(PushMessage::StateUpdate(update)) => self.store.apply_push(&update).await,
            Ok(PushMessage::Heartbeat) => debug!("Push heartbeat"),
            Ok(PushMessage::Unknown(kind)) => {
                info!(kind = %kind, "Unknown push message type — dropped");
            }
            Err(err) => {
                warn!(error = %err, frame = %truncate(text, 200), "Malformed push message — dropped");
            }
        }
    }

    /// CLOSED entry: mark state and arm exactly one reconnect timer.
    fn on_close(self: &Arc<Self>) {
        let mut tasks = self.tasks();
        tasks.in_flight = false;
        tasks.connection = None;

        if tasks.shut_down {
            return;
        }

        self.set_state(ConnectionState::Closed);

        if let Some(stale) = tasks.reconnect.take() {
            stale.abort();
        }

        let inner = Arc::clone(self);
        let delay = self.reconnect_delay;
        // Deadline is fixed at close time, not when the task is first polled.
        let wait = tokio::time::sleep(delay);
        tasks.reconnect = Some(tokio::spawn(async move {
            wait.await;
            inner.connect();
        }));

        info!(delay_ms = delay.as_millis() as u64, "Push reconnect scheduled");
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
