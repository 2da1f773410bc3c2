//! Application configuration management.
//!
//! Configuration is read from the process environment (a `.env` file is
//! loaded by the binary before this runs). Every key has a default, so an
//! empty environment yields a working development setup against
//! `http://localhost:8000/api`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application name used for the data directory and the keyring service.
pub const APP_NAME: &str = "juancharge-mobile";

/// Base URL used when `JUANCHARGE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Transport timeout in seconds, applied to every request including recovery.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_API_URL: &str = "JUANCHARGE_API_URL";
const ENV_TIMEOUT: &str = "JUANCHARGE_API_TIMEOUT_SECS";
const ENV_STORAGE: &str = "JUANCHARGE_STORAGE";
const ENV_DATA_DIR: &str = "JUANCHARGE_DATA_DIR";
const ENV_SINGLE_FLIGHT: &str = "JUANCHARGE_SINGLE_FLIGHT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Could not find a data directory for plaintext credential storage")]
    NoDataDir,
}

/// Which credential backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Probe the platform keychain and fall back to plaintext if unavailable.
    #[default]
    Auto,
    /// Prefer the keychain; still falls back if the probe fails.
    Secure,
    /// Skip the probe and use the plaintext file.
    Plaintext,
}

impl StorageMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "secure" => Some(Self::Secure),
            "plaintext" => Some(Self::Plaintext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub timeout: Duration,
    pub storage: StorageMode,
    pub data_dir: Option<PathBuf>,
    /// Share one auto-login between concurrent 401s instead of one per request.
    pub single_flight_recovery: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage: StorageMode::Auto,
            data_dir: None,
            single_flight_recovery: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT,
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_STORAGE) {
            config.storage = StorageMode::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_STORAGE,
                value: raw,
            })?;
        }

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_SINGLE_FLIGHT) {
            config.single_flight_recovery = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_SINGLE_FLIGHT,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Directory holding the plaintext credential file.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDataDir)?;
        Ok(base.join(APP_NAME))
    }
}
