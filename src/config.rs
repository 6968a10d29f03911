use std::{env, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub store_timeout: Duration,
    pub low_stock_threshold: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_url = lookup("STORE_URL").context("STORE_URL is not set")?;
        let session_secret = lookup("SESSION_SECRET").context("SESSION_SECRET is not set")?;
        if session_secret.trim().is_empty() {
            anyhow::bail!("SESSION_SECRET must not be empty");
        }
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let store_timeout = lookup("STORE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));
        let low_stock_threshold = lookup("LOW_STOCK_THRESHOLD")
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(5);

        Ok(Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            host,
            port,
            session_secret,
            store_timeout,
            low_stock_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORE_URL", "https://store.example.com/api/v1/"),
            ("SESSION_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.store_url, "https://store.example.com/api/v1");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(config.low_stock_threshold, 5);
    }

    #[test]
    fn missing_store_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("SESSION_SECRET", "x")])).unwrap_err();
        assert!(err.to_string().contains("STORE_URL"));
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORE_URL", "http://localhost:4000"),
            ("SESSION_SECRET", "x"),
            ("APP_PORT", "not-a-port"),
            ("LOW_STOCK_THRESHOLD", "12"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.low_stock_threshold, 12);
    }
}
