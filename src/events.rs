//! # events
//!
//! Defines [`DashboardEvent`]: everything the sync layer announces to
//! renderers over the broadcast channel and, from there, over
//! `ws://host/ws/dashboard`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::listener::ConnectionState;
use crate::state::DashboardState;

/// Which channel produced a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSource {
    Snapshot,
    Push,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardEvent {
    /// The merged state changed; carries the full post-apply state.
    StateChanged {
        source: UpdateSource,
        state:  Box<DashboardState>,
    },

    /// Push connection moved to a new state.
    ConnectionChanged {
        state: ConnectionState,
    },

    /// Outcome of a user command, to be shown as a toast.
    Notification {
        notification: Notification,
    },
}

impl DashboardEvent {
    /// Serialize for a WebSocket text frame.
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}

// ─── Notification ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id:      Uuid,
    pub kind:    NotificationKind,
    /// Command name, e.g. `"start_bot"`.
    pub command: &'static str,
    pub message: String,
    pub at:      DateTime<Utc>,
}

impl Notification {
    pub fn success(command: &'static str, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, command, message.into())
    }

    pub fn failure(command: &'static str, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Failure, command, message.into())
    }

    fn new(kind: NotificationKind, command: &'static str, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            command,
            message,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let json = DashboardEvent::ConnectionChanged { state: ConnectionState::Open }.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "CONNECTION_CHANGED");
        assert_eq!(value["state"], "OPEN");

        let json = DashboardEvent::Notification {
            notification: Notification::failure("square_off", "No open position"),
        }
        .to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["notification"]["kind"], "failure");
        assert_eq!(value["notification"]["message"], "No open position");
    }
}
