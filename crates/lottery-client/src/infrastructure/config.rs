//! TOML-based configuration for the client.
//!
//! Every field has a serde default so the client runs with a partial file or
//! no file at all, and unknown keys (legacy loop count/period settings from
//! older deployments) are ignored. After the file is read, a small set of
//! environment variables override individual fields, which is how container
//! deployments give each agency its id.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override held a value of the wrong type.
    #[error("invalid value for {var}: {value:?}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// The agency this client submits bets for.
    #[serde(default = "default_agency_id")]
    pub agency_id: u32,
    /// `host:port` of the lottery server.
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// Maximum number of bets per Batch message.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Directory holding the per-agency record files.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// Delay between winner-query retries, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_agency_id() -> u32 {
    1
}

fn default_server_address() -> String {
    "127.0.0.1:12345".to_string()
}

fn default_max_batch_size() -> usize {
    100
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            agency_id: default_agency_id(),
            server_address: default_server_address(),
            max_batch_size: default_max_batch_size(),
            records_dir: default_records_dir(),
            retry_delay_ms: default_retry_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides from any variable lookup. Factored out of
    /// [`ClientConfig::apply_env_overrides`] so tests can drive it without
    /// mutating process-wide environment state.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("AGENCY_ID") {
            self.agency_id = value.parse().map_err(|_| ConfigError::InvalidOverride {
                var: "AGENCY_ID",
                value,
            })?;
        }
        if let Some(value) = lookup("SERVER_ADDRESS") {
            self.server_address = value;
        }
        if let Some(value) = lookup("MAX_BATCH_SIZE") {
            self.max_batch_size = value.parse().map_err(|_| ConfigError::InvalidOverride {
                var: "MAX_BATCH_SIZE",
                value,
            })?;
        }
        Ok(())
    }

    /// Path of this agency's record file: `<records_dir>/agency-<id>.csv`.
    pub fn records_path(&self) -> PathBuf {
        self.records_dir.join(format!("agency-{}.csv", self.agency_id))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
