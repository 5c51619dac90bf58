//! Configuration loader and application settings.

use crate::cli::Cli;
use crate::errors::{AppError, Result};
use crate::feed::binance::BINANCE_FUTURES_WS_ENDPOINT;
use crate::feed::rest::BINANCE_FUTURES_REST_ENDPOINT;
use crate::format::LocalZone;
use crate::ticker::{DEFAULT_POLL_INTERVAL, DEFAULT_SYMBOL, TickerConfig};
use std::time::Duration;
use url::Url;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Perpetual pair, upper-cased (e.g. "BTCUSDT").
    pub symbol: String,
    /// Futures WebSocket base endpoint.
    pub ws_url: Url,
    /// Futures REST base endpoint.
    pub rest_url: Url,
    pub poll_interval: Duration,
    /// Verbose logging.
    pub debug: bool,
    /// Verbose local zone name used for the time label.
    pub tz_name: Option<String>,
}

impl AppConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn load() -> Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let symbol = lookup("TICKER_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
        let ws_url =
            lookup("TICKER_WS_URL").unwrap_or_else(|| BINANCE_FUTURES_WS_ENDPOINT.to_string());
        let rest_url =
            lookup("TICKER_REST_URL").unwrap_or_else(|| BINANCE_FUTURES_REST_ENDPOINT.to_string());
        let poll_interval = match lookup("TICKER_POLL_SECS") {
            Some(raw) => poll_interval(raw.trim().parse()?)?,
            None => DEFAULT_POLL_INTERVAL,
        };
        let debug = lookup("TICKER_DEBUG").is_some_and(|v| is_enabled(&v));

        Ok(Self {
            symbol: normalize_symbol(&symbol)?,
            ws_url: parse_endpoint(&ws_url, &["ws", "wss"])?,
            rest_url: parse_endpoint(&rest_url, &["http", "https"])?,
            poll_interval,
            debug,
            tz_name: non_blank(lookup("TICKER_TZ_NAME")),
        })
    }

    /// Layer command-line flags over the environment settings.
    pub fn with_cli(mut self, cli: Cli) -> Result<Self> {
        if let Some(symbol) = cli.symbol {
            self.symbol = normalize_symbol(&symbol)?;
        }
        if let Some(ws_url) = cli.ws_url {
            self.ws_url = parse_endpoint(&ws_url, &["ws", "wss"])?;
        }
        if let Some(rest_url) = cli.rest_url {
            self.rest_url = parse_endpoint(&rest_url, &["http", "https"])?;
        }
        if let Some(secs) = cli.poll_secs {
            self.poll_interval = poll_interval(secs)?;
        }
        if let Some(name) = non_blank(cli.tz_name) {
            self.tz_name = Some(name);
        }
        self.debug |= cli.debug;
        Ok(self)
    }

    pub fn ticker_config(&self) -> TickerConfig {
        TickerConfig {
            symbol: self.symbol.clone(),
            poll_interval: self.poll_interval,
        }
    }

    pub fn local_zone(&self) -> LocalZone {
        LocalZone::new(self.tz_name.clone())
    }
}

fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Config(format!("invalid symbol {raw:?}")));
    }
    Ok(symbol)
}

fn parse_endpoint(raw: &str, schemes: &[&str]) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    if !schemes.contains(&url.scheme()) {
        return Err(AppError::Config(format!(
            "endpoint {url} must use one of {schemes:?}"
        )));
    }
    Ok(url)
}

fn poll_interval(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(AppError::Config("poll interval must be at least 1 second".into()));
    }
    Ok(Duration::from_secs(secs))
}

fn is_enabled(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
