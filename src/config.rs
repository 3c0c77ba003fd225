//! Runtime configuration, read from the environment (and `.env` via dotenvy).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::scrapers::ScraperConfig;

/// Upper bound for `FETCH_TIMEOUT_SECS`
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Which persistence implementation `DATABASE_URL` selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sql(String),
}

impl StorageBackend {
    pub fn from_url(url: &str) -> Self {
        match url.trim() {
            "memory" | "memory://" => Self::Memory,
            other => Self::Sql(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub bind_addr: String,
    pub scraper: ScraperConfig,
    /// Local hour (0-23) of the daily batch price check
    pub price_check_hour: u32,
    pub price_check_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Sql("sqlite://grocery.db?mode=rwc".to_string()),
            bind_addr: "0.0.0.0:5000".to_string(),
            scraper: ScraperConfig::default(),
            price_check_hour: 8,
            price_check_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.storage = StorageBackend::from_url(&url);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FETCH_TIMEOUT_SECS")? {
            if !(1..=MAX_FETCH_TIMEOUT_SECS).contains(&secs) {
                return Err(invalid("FETCH_TIMEOUT_SECS", secs));
            }
            config.scraper.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "POLITENESS_DELAY_SECS")? {
            // The batch check always pauses between items
            if secs == 0 {
                return Err(invalid("POLITENESS_DELAY_SECS", secs));
            }
            config.scraper.politeness_delay = Duration::from_secs(secs);
        }
        if let Some(hour) = parse_var::<u32>(&lookup, "PRICE_CHECK_HOUR")? {
            if hour > 23 {
                return Err(invalid("PRICE_CHECK_HOUR", hour));
            }
            config.price_check_hour = hour;
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "PRICE_CHECK_ENABLED")? {
            config.price_check_enabled = enabled;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}
