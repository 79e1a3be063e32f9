use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "https://670b7631ac6860a6c2cc1860.mockapi.io/api/mm-rol/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings. Environment variables (optionally from `.env`) set the
/// defaults; CLI flags override them.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub poll_interval: Duration,
    pub page_size: usize,
    pub channel_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(15),
            page_size: PAGE_SIZE,
            channel_buffer: 32,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("STOREFRONT_API_URL").filter(|url| !url.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(secs) = parse::<u64>(&lookup, "STOREFRONT_POLL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(size) = parse::<usize>(&lookup, "STOREFRONT_PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(buffer) = parse::<usize>(&lookup, "STOREFRONT_CHANNEL_BUFFER")? {
            config.channel_buffer = buffer;
        }
        config.validate()?;
        Ok(config)
    }

    /// Zero-valued sizes and intervals are rejected; tokio panics on them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |key: &'static str| ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        };
        if self.poll_interval.is_zero() {
            return Err(zero("STOREFRONT_POLL_SECS"));
        }
        if self.page_size == 0 {
            return Err(zero("STOREFRONT_PAGE_SIZE"));
        }
        if self.channel_buffer == 0 {
            return Err(zero("STOREFRONT_CHANNEL_BUFFER"));
        }
        Ok(())
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.page_size, 8);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STOREFRONT_API_URL", "http://localhost:3000/"),
            ("STOREFRONT_POLL_SECS", "5"),
            ("STOREFRONT_PAGE_SIZE", " 4 "),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.page_size, 4);
        assert_eq!(config.channel_buffer, 32);
    }

    #[test]
    fn test_rejects_malformed_and_zero() {
        let err = AppConfig::from_lookup(lookup(&[("STOREFRONT_POLL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STOREFRONT_POLL_SECS", .. }));

        let err = AppConfig::from_lookup(lookup(&[("STOREFRONT_CHANNEL_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STOREFRONT_CHANNEL_BUFFER", .. }));
    }
}
