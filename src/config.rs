//! # config: Environment configuration
//!
//! | Variable               | Default                    | Description                          |
//! |------------------------|----------------------------|--------------------------------------|
//! | `BOT_API_URL`          | `http://localhost:8001`    | Base URL of the bot service          |
//! | `BOT_WS_URL`           | derived: `ws://…/ws`       | Push channel endpoint                |
//! | `POLL_INTERVAL_SECS`   | `5`                        | Snapshot polling period              |
//! | `RECONNECT_DELAY_SECS` | `3`                        | Fixed wait before re-dialling push   |
//! | `REQUEST_TIMEOUT_SECS` | `10`                       | Per-request HTTP timeout             |
//! | `TRADE_HISTORY_LIMIT`  | `50`                       | `limit` for `GET /api/trades`, 1-100 |
//! | `LOG_LIMIT`            | `100`                      | `limit` for `GET /api/logs`, 1-500   |
//! | `BIND_ADDR`            | `127.0.0.1:3000`           | Local dashboard listener             |
//! | `DASHBOARD_API_KEY`    | unset                      | `X-API-Key` for local routes         |
//!
//! Durations are whole seconds and must be non-zero.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

/// Fixed backoff before a dropped push connection is re-dialled.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Upper bounds the bot service enforces on `limit` (`le=` on its query params).
pub const MAX_TRADE_LIMIT: u32 = 100;
pub const MAX_LOG_LIMIT: u32 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the bot service; `/api/...` paths are appended to it.
    pub api_url:           Url,
    pub ws_url:            Url,
    pub poll_interval:     Duration,
    pub reconnect_delay:   Duration,
    pub request_timeout:   Duration,
    pub trade_limit:       u32,
    pub log_limit:         u32,
    pub bind_addr:         SocketAddr,
    /// `None` = dev mode, local routes open to anyone on the bind address.
    pub dashboard_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("BOT_API_URL").unwrap_or_else(|_| "http://localhost:8001".to_string());
        let api_url = Url::parse(&api_url).with_context(|| format!("BOT_API_URL is not a URL: '{api_url}'"))?;

        let ws_url = match std::env::var("BOT_WS_URL") {
            Ok(raw) => Url::parse(&raw).with_context(|| format!("BOT_WS_URL is not a URL: '{raw}'"))?,
            Err(_) => derive_ws_url(&api_url)?,
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        Ok(Self {
            api_url,
            ws_url,
            poll_interval:     nonzero_secs("POLL_INTERVAL_SECS", env_u64("POLL_INTERVAL_SECS", 5)?)?,
            reconnect_delay:   nonzero_secs("RECONNECT_DELAY_SECS", env_u64("RECONNECT_DELAY_SECS", RECONNECT_DELAY.as_secs())?)?,
            request_timeout:   nonzero_secs("REQUEST_TIMEOUT_SECS", env_u64("REQUEST_TIMEOUT_SECS", 10)?)?,
            trade_limit:       bounded_limit("TRADE_HISTORY_LIMIT", env_u64("TRADE_HISTORY_LIMIT", 50)?, MAX_TRADE_LIMIT)?,
            log_limit:         bounded_limit("LOG_LIMIT", env_u64("LOG_LIMIT", 100)?, MAX_LOG_LIMIT)?,
            bind_addr,
            dashboard_api_key: std::env::var("DASHBOARD_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    /// Config pointing at a service under `api_url`, with default timings.
    pub fn for_service(api_url: Url) -> anyhow::Result<Self> {
        let ws_url = derive_ws_url(&api_url)?;
        Ok(Self {
            api_url,
            ws_url,
            poll_interval:     Duration::from_secs(5),
            reconnect_delay:   RECONNECT_DELAY,
            request_timeout:   Duration::from_secs(10),
            trade_limit:       50,
            log_limit:         100,
            bind_addr:         SocketAddr::from(([127, 0, 0, 1], 3000)),
            dashboard_api_key: None,
        })
    }
}

fn env_u64(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("{key} must be a number, got '{v}'")),
        Err(_) => Ok(default),
    }
}

fn nonzero_secs(key: &str, secs: u64) -> anyhow::Result<Duration> {
    if secs == 0 {
        bail!("{key} must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

/// `limit` query value in `1..=max`.
fn bounded_limit(key: &str, value: u64, max: u32) -> anyhow::Result<u32> {
    let limit = u32::try_from(value).with_context(|| format!("{key} is out of range: {value}"))?;
    if !(1..=max).contains(&limit) {
        bail!("{key} must be between 1 and {max}, got {limit}");
    }
    Ok(limit)
}

/// `http://host:port/anything` → `ws://host:port/ws` (`https` → `wss`).
pub fn derive_ws_url(api_url: &Url) -> anyhow::Result<Url> {
    let scheme = match api_url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => bail!("Cannot derive push URL from '{other}' scheme; set BOT_WS_URL"),
    };

    let mut ws_url = api_url.clone();
    if ws_url.set_scheme(scheme).is_err() {
        bail!("Cannot switch '{api_url}' to {scheme}://");
    }
    ws_url.set_path("/ws");
    ws_url.set_query(None);
    Ok(ws_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_ws_url_from_http() {
        let api = Url::parse("http://10.0.0.5:8001/").unwrap();
        assert_eq!(derive_ws_url(&api).unwrap().as_str(), "ws://10.0.0.5:8001/ws");
    }

    #[test]
    fn derives_wss_url_from_https() {
        let api = Url::parse("https://bot.example.com/api?x=1").unwrap();
        assert_eq!(derive_ws_url(&api).unwrap().as_str(), "wss://bot.example.com/ws");
    }

    #[test]
    fn zero_durations_are_rejected() {
        assert!(nonzero_secs("POLL_INTERVAL_SECS", 0).is_err());
        assert!(nonzero_secs("REQUEST_TIMEOUT_SECS", 0).is_err());
        assert_eq!(nonzero_secs("POLL_INTERVAL_SECS", 5).unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn limits_stay_within_service_bounds() {
        assert_eq!(bounded_limit("TRADE_HISTORY_LIMIT", 100, MAX_TRADE_LIMIT).unwrap(), 100);
        assert!(bounded_limit("TRADE_HISTORY_LIMIT", 101, MAX_TRADE_LIMIT).is_err());
        assert!(bounded_limit("LOG_LIMIT", 0, MAX_LOG_LIMIT).is_err());
        assert_eq!(bounded_limit("LOG_LIMIT", 500, MAX_LOG_LIMIT).unwrap(), 500);
        // Would wrap to 1 under an `as u32` cast.
        assert!(bounded_limit("LOG_LIMIT", u64::from(u32::MAX) + 2, MAX_LOG_LIMIT).is_err());
    }

    #[test]
    fn rejects_unknown_scheme() {
        let api = Url::parse("ftp://bot.example.com").unwrap();
        assert!(derive_ws_url(&api).is_err());
    }
}
