//! Monitor configuration: station credentials and refresh settings.
//!
//! Read from a TOML file, then overridden by the environment:
//! `AMBIENT_API_KEY`, and `AMBIENT_APP_KEY` (or `AMBIENT_APPLICATION_KEY`).

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://rt.ambientweather.net";

/// Environment variables consulted for credentials, in order of precedence.
const API_KEY_VARS: [&str; 1] = ["AMBIENT_API_KEY"];
const APP_KEY_VARS: [&str; 2] = ["AMBIENT_APP_KEY", "AMBIENT_APPLICATION_KEY"];

/// Longest refresh interval accepted: one week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// An error in loading, saving or using the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("API Key and Application Key are required")]
    MissingKeys,
    #[error("refresh interval must be between 1 and {} minutes", MAX_INTERVAL_MINUTES)]
    InvalidInterval,
    #[error("history capacity must be positive")]
    InvalidCapacity,
    #[error("no config directory on this platform; pass a config path")]
    NoConfigDir,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ambient: AmbientConfig,
    pub refresh: RefreshConfig,
    pub history: HistoryConfig,
}

/// Where and how to reach the Ambient Weather API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,
    pub endpoint: String,
    /// MAC address of the station to read; the account's first device if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            app_key: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            device: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_minutes: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}

/// A validated API key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub app_key: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask(&self.api_key))
            .field("app_key", &mask(&self.app_key))
            .finish()
    }
}

/// Obscure a secret for display, keeping the last four characters.
pub fn mask(secret: &str) -> String {
    let n = secret.chars().count();
    if n <= 4 {
        return "*".repeat(n);
    }
    let tail: String = secret.chars().skip(n - 4).collect();
    format!("{}{}", "*".repeat(n - 4), tail)
}

impl AmbientConfig {
    /// Both keys, trimmed; fails unless both are non-empty.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let key = |k: &Option<String>| {
            k.as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned)
        };
        match (key(&self.api_key), key(&self.app_key)) {
            (Some(api_key), Some(app_key)) => Ok(Credentials { api_key, app_key }),
            _ => Err(ConfigError::MissingKeys),
        }
    }
}

impl Config {
    /// Default config file location, e.g. ~/.config/aqi-monitor/config.toml.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("aqi-monitor").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config file at `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, text).map_err(write_err)?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Apply credential overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|var| std::env::var(var).ok());
    }

    /// Apply credential overrides from `lookup`, which maps variable names to values.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |vars: &[&str]| {
            vars.iter()
                .filter_map(|v| lookup(v))
                .find(|value| !value.trim().is_empty())
        };
        if let Some(key) = first(&API_KEY_VARS) {
            self.ambient.api_key = Some(key);
        }
        if let Some(key) = first(&APP_KEY_VARS) {
            self.ambient.app_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_INTERVAL_MINUTES).contains(&self.refresh.interval_minutes) {
            return Err(ConfigError::InvalidInterval);
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_minutes.saturating_mul(60))
    }
}
