//! # engine::dispatcher
//!
//! **Command Dispatcher**: user-initiated writes to the bot service.
//!
//! Each [`Command`] is one POST.  The outcome is announced as a
//! [`Notification`] event:
//!
//! * success → success toast, then an immediate snapshot refresh so the
//!   dashboard shows the effect without waiting for the next poll;
//! * failure → failure toast carrying the service's own reason.  Local state
//!   is left exactly as it was.
//!
//! Callers on the UI path use [`CommandDispatcher::dispatch`], which spawns and
//! returns at once; the listener and poller are never blocked by a command.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::BotApi;
use crate::error::SyncError;
use crate::events::{DashboardEvent, Notification, NotificationKind};
use crate::models::{ConfigUpdate, TradingMode};
use crate::state::StateStore;

use super::fetcher::SnapshotFetcher;

// ─── Command ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartBot,
    StopBot,
    SquareOff,
    UpdateConfig(ConfigUpdate),
    SetMode(TradingMode),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartBot => "start_bot",
            Command::StopBot => "stop_bot",
            Command::SquareOff => "square_off",
            Command::UpdateConfig(_) => "update_config",
            Command::SetMode(_) => "set_mode",
        }
    }

    /// True when the command carries broker credentials.  Their values are
    /// redacted from every log line; only the fact of the change is logged.
    fn touches_credentials(&self) -> bool {
        matches!(self, Command::UpdateConfig(update) if update.touches_credentials())
    }

    /// Toast text when the service confirms without a message of its own.
    fn fallback_message(&self) -> String {
        match self {
            Command::StartBot => "Bot started".to_string(),
            Command::StopBot => "Bot stopped".to_string(),
            Command::SquareOff => "Position squared off".to_string(),
            Command::UpdateConfig(_) => "Configuration updated".to_string(),
            Command::SetMode(mode) => format!("Switched to {mode} mode"),
        }
    }
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CommandDispatcher {
    api:     BotApi,
    fetcher: SnapshotFetcher,
    store:   StateStore,
}

impl CommandDispatcher {
    pub fn new(api: BotApi, fetcher: SnapshotFetcher, store: StateStore) -> Self {
        Self { api, fetcher, store }
    }

    /// Fire-and-forget: run the command on its own task.
    pub fn dispatch(&self, command: Command) -> JoinHandle<Notification> {
        let this = self.clone();
        tokio::spawn(async move { this.execute(command).await })
    }

    /// Run a command to completion and return the notification it produced.
    pub async fn execute(&self, command: Command) -> Notification {
        let name = command.name();
        info!(command = name, args = ?command, "▶ Command");
        if command.touches_credentials() {
            info!(command = name, "🔑 Broker credentials change requested");
        }

        let notification = match self.send(&command).await {
            Ok(reply) => {
                let message = if reply.is_empty() { command.fallback_message() } else { reply };
                info!(command = name, %message, "✅ Command accepted");
                Notification::success(name, message)
            }
            Err(err) => {
                warn!(command = name, error = %err, "❌ Command failed");
                Notification::failure(name, err.user_detail())
            }
        };

        self.store.publish(DashboardEvent::Notification {
            notification: notification.clone(),
        });

        if notification.kind == NotificationKind::Success {
            // A failed refresh is logged by the fetcher; the next poll retries.
            let _ = self.fetcher.refresh().await;
        }

        notification
    }

    async fn send(&self, command: &Command) -> Result<String, SyncError> {
        match command {
            Command::StartBot => self.api.start_bot().await,
            Command::StopBot => self.api.stop_bot().await,
            Command::SquareOff => self.api.square_off().await,
            Command::UpdateConfig(update) if update.is_empty() => {
                Err(SyncError::Rejected("Nothing to update".to_string()))
            }
            Command::UpdateConfig(update) => self.api.update_config(update).await,
            Command::SetMode(mode) => self.api.set_mode(*mode).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_stable() {
        assert_eq!(Command::StartBot.name(), "start_bot");
        assert_eq!(Command::StopBot.name(), "stop_bot");
        assert_eq!(Command::SquareOff.name(), "square_off");
        assert_eq!(Command::UpdateConfig(ConfigUpdate::default()).name(), "update_config");
        assert_eq!(Command::SetMode(TradingMode::Paper).name(), "set_mode");
    }

    #[test]
    fn only_credential_updates_are_flagged() {
        let token = ConfigUpdate {
            access_token: Some("secret".to_string()),
            ..ConfigUpdate::default()
        };
        let qty = ConfigUpdate {
            order_quantity: Some(75),
            ..ConfigUpdate::default()
        };

        assert!(Command::UpdateConfig(token.clone()).touches_credentials());
        assert!(!Command::UpdateConfig(qty).touches_credentials());
        assert!(!Command::StartBot.touches_credentials());
        assert!(!format!("{:?}", Command::UpdateConfig(token)).contains("secret"));
    }

    #[test]
    fn fallback_mentions_mode() {
        assert_eq!(
            Command::SetMode(TradingMode::Paper).fallback_message(),
            "Switched to paper mode"
        );
    }
}
