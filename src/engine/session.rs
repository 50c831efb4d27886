//! # engine::session
//!
//! One dashboard session: the store plus the three workers that feed it.
//! `start()` kicks off polling (its first tick is the startup fetch) and the
//! push connection; `shutdown()` stops both and cancels any pending reconnect.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::BotApi;
use crate::config::Config;
use crate::state::StateStore;

use super::dispatcher::CommandDispatcher;
use super::fetcher::SnapshotFetcher;
use super::listener::{ConnectionState, Connector, PushListener};
use super::transport::WsConnector;

pub struct Session<C: Connector = WsConnector> {
    store:         StateStore,
    fetcher:       SnapshotFetcher,
    dispatcher:    CommandDispatcher,
    listener:      PushListener<C>,
    poll_interval: Duration,
    poller:        Mutex<Option<JoinHandle<()>>>,
}

impl Session<WsConnector> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, WsConnector::new(config.ws_url.clone()))
    }
}

impl<C: Connector> Session<C> {
    pub fn new(config: &Config, connector: C) -> Self {
        let store = StateStore::new();
        let api = BotApi::new(config);
        let fetcher = SnapshotFetcher::new(
            api.clone(),
            store.clone(),
            config.trade_limit,
            config.log_limit,
        );
        let dispatcher = CommandDispatcher::new(api, fetcher.clone(), store.clone());
        let listener = PushListener::new(connector, store.clone(), config.reconnect_delay);

        Self {
            store,
            fetcher,
            dispatcher,
            listener,
            poll_interval: config.poll_interval,
            poller: Mutex::new(None),
        }
    }

    /// Start polling and open the push channel.  Calling twice is harmless.
    pub fn start(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        if poller.is_none() {
            let fetcher = self.fetcher.clone();
            *poller = Some(tokio::spawn(fetcher.run_polling(self.poll_interval)));
            info!(period_secs = self.poll_interval.as_secs(), "📡 Snapshot polling started");
        }
        drop(poller);

        self.listener.connect();
    }

    /// Stop polling and close the push channel.  Returns once both have
    /// stopped, so no snapshot or push lands after it.
    pub async fn shutdown(&self) {
        let poller = self.poller.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = poller {
            handle.abort();
            let _ = handle.await;
        }
        self.listener.close().await;
        info!("Session shut down");
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn fetcher(&self) -> &SnapshotFetcher {
        &self.fetcher
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn listener(&self) -> &PushListener<C> {
        &self.listener
    }

    pub fn connection(&self) -> ConnectionState {
        self.listener.status()
    }
}
