use serde::Deserialize;
use std::time::Duration;

use crate::errors::{ConnectorError, Result};

/// Per-adapter settings. Every field has a default, so a partial TOML or
/// JSON table deserializes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Overrides the exchange's public base URL.
    pub base_url: Option<String>,
    pub rate_cache_duration_ms: u64,
    pub currency_pairs_cache_duration_ms: u64,
    pub http_timeout_ms: u64,
    /// Levels per side requested where the exchange takes a depth parameter.
    pub board_depth: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: None,
            rate_cache_duration_ms: 30_000,
            currency_pairs_cache_duration_ms: 7 * 24 * 60 * 60 * 1000,
            http_timeout_ms: 5_000,
            board_depth: 50,
        }
    }
}

impl ClientConfig {
    pub const ENV_PREFIX: &'static str = "EXCHANGE_CLIENT_";

    /// Defaults overridden by `EXCHANGE_CLIENT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = ClientConfig::default();
        let var = |name: &str| lookup(&format!("{}{}", Self::ENV_PREFIX, name));
        let number = |name: &str, raw: String| -> Result<u64> {
            raw.trim()
                .parse()
                .map_err(|e| ConnectorError::parse(format!("{}{}", Self::ENV_PREFIX, name), e))
        };

        if let Some(url) = var("BASE_URL") {
            config.base_url = Some(url);
        }
        if let Some(raw) = var("RATE_CACHE_DURATION_MS") {
            config.rate_cache_duration_ms = number("RATE_CACHE_DURATION_MS", raw)?;
        }
        if let Some(raw) = var("CURRENCY_PAIRS_CACHE_DURATION_MS") {
            config.currency_pairs_cache_duration_ms =
                number("CURRENCY_PAIRS_CACHE_DURATION_MS", raw)?;
        }
        if let Some(raw) = var("HTTP_TIMEOUT_MS") {
            config.http_timeout_ms = number("HTTP_TIMEOUT_MS", raw)?;
        }
        if let Some(raw) = var("BOARD_DEPTH") {
            let depth = number("BOARD_DEPTH", raw)?;
            config.board_depth = u32::try_from(depth)
                .map_err(|e| ConnectorError::parse("EXCHANGE_CLIENT_BOARD_DEPTH", e))?;
        }
        Ok(config)
    }

    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn rate_cache_duration(&self) -> Duration {
        Duration::from_millis(self.rate_cache_duration_ms)
    }

    pub fn currency_pairs_cache_duration(&self) -> Duration {
        Duration::from_millis(self.currency_pairs_cache_duration_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"rate_cache_duration_ms": 1000}"#).unwrap();
        assert_eq!(config.rate_cache_duration(), Duration::from_secs(1));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.currency_pairs_cache_duration(),
            Duration::from_secs(7 * 24 * 3600)
        );
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("EXCHANGE_CLIENT_BASE_URL", "http://localhost:4243/"),
            ("EXCHANGE_CLIENT_HTTP_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url_or("https://api.lbkex.com"), "http://localhost:4243");
        assert_eq!(config.http_timeout(), Duration::from_millis(250));
        assert_eq!(config.rate_cache_duration_ms, 30_000);
    }

    #[test]
    fn bad_env_value_is_an_error() {
        let err = ClientConfig::from_lookup(|k| {
            (k == "EXCHANGE_CLIENT_RATE_CACHE_DURATION_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("RATE_CACHE_DURATION_MS"));
    }
}
