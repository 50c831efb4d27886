//! # api: Bot service REST client
//!
//! Thin typed wrapper over the bot service's HTTP surface.  One shared
//! `reqwest::Client` (connection pooling); every request carries the
//! configured timeout.
//!
//! ## Endpoints
//!
//! | Method | Path                  | Used by            |
//! |--------|-----------------------|--------------------|
//! | GET    | `/api/status`         | Snapshot Fetcher   |
//! | GET    | `/api/market/nifty`   | Snapshot Fetcher   |
//! | GET    | `/api/position`       | Snapshot Fetcher   |
//! | GET    | `/api/trades?limit=`  | Snapshot Fetcher   |
//! | GET    | `/api/summary`        | Snapshot Fetcher   |
//! | GET    | `/api/logs?limit=`    | Snapshot Fetcher   |
//! | GET    | `/api/config`         | Snapshot Fetcher   |
//! | POST   | `/api/bot/start`      | Command Dispatcher |
//! | POST   | `/api/bot/stop`       | Command Dispatcher |
//! | POST   | `/api/bot/squareoff`  | Command Dispatcher |
//! | POST   | `/api/config/update`  | Command Dispatcher |
//! | POST   | `/api/config/mode`    | Command Dispatcher |

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::SyncError;
use crate::models::{
    BotConfig, BotStatus, ConfigUpdate, LogEntry, MarketTick, Position, Summary, Trade,
    TradingMode,
};

#[derive(Debug, Clone)]
pub struct BotApi {
    http:    reqwest::Client,
    base:    String,
    timeout: Duration,
}

impl BotApi {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), &config.api_url, config.request_timeout)
    }

    pub fn with_client(http: reqwest::Client, base: &Url, timeout: Duration) -> Self {
        Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{path}", self.base)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    pub async fn status(&self) -> Result<BotStatus, SyncError> {
        self.get("/status", &[]).await
    }

    pub async fn market_tick(&self) -> Result<MarketTick, SyncError> {
        self.get("/market/nifty", &[]).await
    }

    pub async fn position(&self) -> Result<Position, SyncError> {
        self.get("/position", &[]).await
    }

    pub async fn trades(&self, limit: u32) -> Result<Vec<Trade>, SyncError> {
        self.get("/trades", &[("limit", limit.to_string())]).await
    }

    pub async fn summary(&self) -> Result<Summary, SyncError> {
        self.get("/summary", &[]).await
    }

    pub async fn logs(&self, limit: u32) -> Result<Vec<LogEntry>, SyncError> {
        self.get("/logs", &[("limit", limit.to_string())]).await
    }

    pub async fn config(&self) -> Result<BotConfig, SyncError> {
        self.get("/config", &[]).await
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    pub async fn start_bot(&self) -> Result<String, SyncError> {
        self.post("/bot/start", &[], None::<&()>).await
    }

    pub async fn stop_bot(&self) -> Result<String, SyncError> {
        self.post("/bot/stop", &[], None::<&()>).await
    }

    pub async fn square_off(&self) -> Result<String, SyncError> {
        self.post("/bot/squareoff", &[], None::<&()>).await
    }

    pub async fn update_config(&self, update: &ConfigUpdate) -> Result<String, SyncError> {
        self.post("/config/update", &[], Some(update)).await
    }

    pub async fn set_mode(&self, mode: TradingMode) -> Result<String, SyncError> {
        self.post("/config/mode", &[("mode", mode.to_string())], None::<&()>).await
    }

    // ── Plumbing ──────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(SyncError::Status {
                endpoint: format!("GET {path}"),
                status:   status.as_u16(),
                detail:   error_detail(&body, status),
            });
        }

        debug!(%url, bytes = body.len(), "GET ok");
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST a command.  Returns the service's confirmation message.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String, SyncError> {
        let url = self.endpoint(path);
        let mut req = self.http.post(&url).query(query).timeout(self.timeout);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(SyncError::Status {
                endpoint: format!("POST {path}"),
                status:   status.as_u16(),
                detail:   error_detail(&bytes, status),
            });
        }

        command_reply(&bytes)
    }
}

/// Some commands answer HTTP 200 with `{"status": "error", "message": ...}`.
fn command_reply(body: &[u8]) -> Result<String, SyncError> {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let message = value.get("message").and_then(Value::as_str).map(str::to_string);

    if value.get("status").and_then(Value::as_str) == Some("error") {
        return Err(SyncError::Rejected(
            message.unwrap_or_else(|| "Command rejected".to_string()),
        ));
    }

    Ok(message.unwrap_or_default())
}

/// Best human-readable reason from an error body: `detail`, then `message`,
/// then the raw text, then the status reason.
fn error_detail(body: &[u8], status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            // Validation errors: [{"loc": [...], "msg": "...", ...}, ...]
            Some(Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
        if let Some(msg) = value.get("message").and_then(Value::as_str) {
            return msg.to_string();
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn detail_prefers_service_detail() {
        let body = br#"{"detail":"Cannot change mode with open position"}"#;
        assert_eq!(
            error_detail(body, StatusCode::BAD_REQUEST),
            "Cannot change mode with open position"
        );
    }

    #[test]
    fn detail_joins_validation_messages() {
        let body = br#"{"detail":[{"loc":["query","mode"],"msg":"string does not match regex"}]}"#;
        assert_eq!(
            error_detail(body, StatusCode::UNPROCESSABLE_ENTITY),
            "string does not match regex"
        );
    }

    #[test]
    fn detail_falls_back_to_text_then_reason() {
        assert_eq!(error_detail(b"upstream down", StatusCode::BAD_GATEWAY), "upstream down");
        assert_eq!(error_detail(b"", StatusCode::BAD_GATEWAY), "Bad Gateway");
    }

    #[test]
    fn reply_with_error_status_is_rejected() {
        let err = command_reply(br#"{"status":"error","message":"Bot already running"}"#)
            .unwrap_err();
        assert_eq!(err.user_detail(), "Bot already running");
    }

    #[test]
    fn reply_with_success_returns_message() {
        assert_eq!(
            command_reply(br#"{"status":"success","message":"Bot started"}"#).unwrap(),
            "Bot started"
        );
        assert_eq!(command_reply(br#"{"status":"success","mode":"paper"}"#).unwrap(), "");
    }
}
