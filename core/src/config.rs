//! Backend location and call timeout, read from the environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

pub const BASE_URL_KEY: &str = "RECYCLE_API_URL";
pub const TIMEOUT_KEY: &str = "RECYCLE_API_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: &str = "15";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the backend lives and how long a call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url: String = try_load(&lookup, BASE_URL_KEY, DEFAULT_BASE_URL)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: BASE_URL_KEY,
                value: base_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }
        let secs: u64 = try_load(&lookup, TIMEOUT_KEY, DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(secs),
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}
