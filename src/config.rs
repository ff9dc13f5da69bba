//! Configuration for RelayKV
//!
//! Centralized configuration with sensible defaults, plus an optional
//! JSON file overlay for the server binary.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};

/// Main configuration for a RelayKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── snapshots/       (<unixMillis>-snapshot.json)
    ///     └── logs/            (<unixMillis>.kvslog)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Append Log Configuration
    // -------------------------------------------------------------------------
    /// Whether mutating commands are written to the append log
    pub append_log_enabled: bool,

    /// Entries a log file may hold before the next write rotates it
    pub log_rotation_threshold: usize,

    // -------------------------------------------------------------------------
    // Snapshot Configuration
    // -------------------------------------------------------------------------
    /// Whether the full state is periodically written to disk
    pub snapshot_enabled: bool,

    /// How often the snapshot timer fires
    pub snapshot_interval: Duration,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Attempts made to bind/connect before giving up
    pub connect_attempts: u32,

    /// Fixed delay between connect attempts
    pub connect_retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./relaykv_data"),
            append_log_enabled: true,
            log_rotation_threshold: 5,
            snapshot_enabled: true,
            snapshot_interval: Duration::from_secs(10),
            listen_addr: "127.0.0.1:7878".to_string(),
            max_connections: 1024,
            connect_attempts: 5,
            connect_retry_delay: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load defaults overlaid with the JSON file at `path`
    ///
    /// A missing file yields the defaults; any other failure is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RelayError::Config(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let file: FileConfig = serde_json::from_str(&text).map_err(|e| {
            RelayError::Config(format!("invalid config file {}: {}", path.display(), e))
        })?;

        Ok(file.apply(Self::default()))
    }

    /// Directory holding snapshot files
    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    /// Directory holding append log files
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// On-disk shape of the config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    append_log_enabled: Option<bool>,
    log_rotation_threshold: Option<usize>,
    snapshot_enabled: Option<bool>,
    snapshot_interval_ms: Option<u64>,
    listen_addr: Option<String>,
    max_connections: Option<usize>,
    connect_attempts: Option<u32>,
    connect_retry_delay_ms: Option<u64>,
}

impl FileConfig {
    fn apply(self, mut config: Config) -> Config {
        if let Some(v) = self.data_dir {
            config.data_dir = v;
        }
        if let Some(v) = self.append_log_enabled {
            config.append_log_enabled = v;
        }
        if let Some(v) = self.log_rotation_threshold {
            config.log_rotation_threshold = v;
        }
        if let Some(v) = self.snapshot_enabled {
            config.snapshot_enabled = v;
        }
        if let Some(ms) = self.snapshot_interval_ms {
            config.snapshot_interval = Duration::from_millis(ms);
        }
        if let Some(v) = self.listen_addr {
            config.listen_addr = v;
        }
        if let Some(v) = self.max_connections {
            config.max_connections = v;
        }
        if let Some(v) = self.connect_attempts {
            config.connect_attempts = v;
        }
        if let Some(ms) = self.connect_retry_delay_ms {
            config.connect_retry_delay = Duration::from_millis(ms);
        }
        config
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an existing config instead of the defaults
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the data directory (root for snapshots and logs)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Enable or disable the append log
    pub fn append_log_enabled(mut self, enabled: bool) -> Self {
        self.config.append_log_enabled = enabled;
        self
    }

    /// Set how many entries a log file holds before rotating
    pub fn log_rotation_threshold(mut self, entries: usize) -> Self {
        self.config.log_rotation_threshold = entries;
        self
    }

    /// Enable or disable periodic snapshots
    pub fn snapshot_enabled(mut self, enabled: bool) -> Self {
        self.config.snapshot_enabled = enabled;
        self
    }

    /// Set the snapshot timer interval
    pub fn snapshot_interval(mut self, interval: Duration) -> Self {
        self.config.snapshot_interval = interval;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set how many times transport setup is attempted
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.config.connect_attempts = attempts;
        self
    }

    /// Set the delay between transport setup attempts
    pub fn connect_retry_delay(mut self, delay: Duration) -> Self {
        self.config.connect_retry_delay = delay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
