//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cache::{TTL_FAST, TTL_SLOW};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5411";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("invalid base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("unable to determine a data directory; set HELPTOOL_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpToolConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub ttl_fast: Duration,
    pub ttl_slow: Duration,
    /// Directory for the local device/link store.
    pub data_dir: PathBuf,
}

impl HelpToolConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `HELPTOOL_BASE_URL`: default `http://127.0.0.1:5411`
    /// - `HELPTOOL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HELPTOOL_CONNECT_TIMEOUT_SECS`: default 10
    /// - `HELPTOOL_TTL_FAST_MS`: default 15000
    /// - `HELPTOOL_TTL_SLOW_MS`: default 60000
    /// - `HELPTOOL_DATA_DIR`: default is the platform data directory
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not parse, the base URL has no
    /// http(s) scheme, or no data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`HelpToolConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = normalize_base_url(
            lookup("HELPTOOL_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;

        let timeouts = Timeouts {
            request: Duration::from_secs(parse_u64(
                &lookup,
                "HELPTOOL_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            connect: Duration::from_secs(parse_u64(
                &lookup,
                "HELPTOOL_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
        };

        let ttl_fast = Duration::from_millis(parse_u64(&lookup, "HELPTOOL_TTL_FAST_MS", millis(TTL_FAST))?);
        let ttl_slow = Duration::from_millis(parse_u64(&lookup, "HELPTOOL_TTL_SLOW_MS", millis(TTL_SLOW))?);

        let data_dir = match lookup("HELPTOOL_DATA_DIR").filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self { base_url, timeouts, ttl_fast, ttl_slow, data_dir })
    }

    /// Replace the base URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the URL has no http(s) scheme.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_u64<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("de", "helptool", "helptool")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or(ConfigError::NoDataDir)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
