//! Engine Module
//!
//! The command engine that coordinates all components.
//!
//! ## Responsibilities
//! - Parse raw commands and apply them to the state
//! - Forward mutating commands to the append log
//! - Decide when a snapshot is due and write it
//! - Restore the latest snapshot on startup
//!
//! ## Command Lifecycle
//! ```text
//! Received ─► Parsed ─► Applied ─► Logged? ─► Responded
//!        └──► ParseFailed ───────────────────► Responded
//! ```
//! There is no retry path; a failure is reported once and the command is
//! discarded.

use std::fs;
use std::path::{Path, PathBuf};

use crate::applog::AppendLog;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{self, Response};
use crate::snapshot::SnapshotManager;
use crate::state::{Outcome, StateStore};

/// The command engine
///
/// ## Ownership
///
/// The engine exclusively owns the state, the open log file and both
/// mutation counters. It takes `&mut self` everywhere and is driven by a
/// single thread (see [`crate::runtime`]), so nothing here is locked.
///
/// ## Counters
///
/// Two independent counters see the same increment-on-mutation event:
/// - the append log's per-file entry count, reset on rotation
/// - `mutations_since_snapshot`, reset after a successful snapshot write
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// In-memory key-value state
    state: StateStore,

    /// Snapshot writer/restorer
    snapshots: SnapshotManager,

    /// Open log file, present only when logging is enabled
    append_log: Option<AppendLog>,

    /// Mutating commands applied since the last snapshot write
    mutations_since_snapshot: u64,
}

impl Engine {
    /// Open an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Restore the latest snapshot, if any
    /// 3. Open a fresh append log file if logging is enabled
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Seed state from the newest snapshot
        let snapshots = SnapshotManager::open(&config.snapshot_dir())?;
        let state = snapshots.restore()?;

        // Step 3: Open log (creates logs/ if absent)
        let append_log = if config.append_log_enabled {
            Some(AppendLog::open(
                &config.log_dir(),
                config.log_rotation_threshold,
            )?)
        } else {
            None
        };

        tracing::info!(
            "Engine opened at {} ({} keys, append log {}, snapshots {})",
            config.data_dir.display(),
            state.len(),
            if append_log.is_some() { "on" } else { "off" },
            if config.snapshot_enabled { "on" } else { "off" },
        );

        Ok(Self {
            config,
            state,
            snapshots,
            append_log,
            mutations_since_snapshot: 0,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Handle one raw command and produce its response
    ///
    /// Parse failures become `ERR` responses and leave state and log
    /// untouched. Errors returned here are persistence failures; the state
    /// change has already been applied when they occur.
    pub fn handle(&mut self, raw: &str) -> Result<Response> {
        let query = match protocol::parse(raw) {
            Ok(query) => query,
            Err(e) => {
                tracing::debug!("Rejected command {:?}: {}", raw, e);
                return Ok(Response::error(e));
            }
        };

        tracing::trace!("Applying {:?}", query);

        let Outcome { response, mutated } = self.state.apply(query);

        if mutated {
            self.mutations_since_snapshot += 1;

            if let Some(log) = self.append_log.as_mut() {
                log.record(raw)?;
            }
        }

        Ok(response)
    }

    /// Timer callback: write a snapshot if anything mutated since the last one
    ///
    /// Returns the new snapshot path, or `None` when nothing was due.
    pub fn snapshot_tick(&mut self) -> Result<Option<PathBuf>> {
        if self.mutations_since_snapshot == 0 {
            tracing::debug!("Snapshot tick skipped: no mutations");
            return Ok(None);
        }

        let path = self.snapshots.write(&self.state)?;
        self.mutations_since_snapshot = 0;

        Ok(Some(path))
    }

    /// Close the engine gracefully
    ///
    /// Flushes and closes the append log. No snapshot is taken.
    pub fn close(self) -> Result<()> {
        if let Some(log) = self.append_log {
            log.close()?;
        }

        tracing::info!("Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the current state
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Mutating commands applied since the last snapshot
    pub fn mutations_since_snapshot(&self) -> u64 {
        self.mutations_since_snapshot
    }

    /// Path of the currently open log file
    pub fn append_log_path(&self) -> Option<&Path> {
        self.append_log.as_ref().map(AppendLog::path)
    }

    /// Snapshot timer interval, or `None` when snapshots are disabled
    pub fn snapshot_interval(&self) -> Option<std::time::Duration> {
        self.config
            .snapshot_enabled
            .then_some(self.config.snapshot_interval)
    }

    /// Get the snapshot manager
    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
