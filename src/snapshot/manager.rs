//! Snapshot Manager
//!
//! Finds, restores and writes snapshot files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::clock;
use crate::error::{RelayError, Result};
use crate::state::StateStore;

use super::SNAPSHOT_SUFFIX;

/// Manages the snapshot directory
///
/// The directory is created lazily by the first write; a missing directory
/// simply means there is nothing to restore.
pub struct SnapshotManager {
    /// Directory where snapshots are stored
    dir: PathBuf,

    /// Timestamp of the newest snapshot known to this manager
    last_timestamp: u64,
}

impl SnapshotManager {
    /// Open the manager over `dir`
    ///
    /// Seeds the timestamp sequence from the newest existing snapshot so new
    /// files always sort after old ones.
    pub fn open(dir: &Path) -> Result<Self> {
        let last_timestamp = Self::list_in(dir)?
            .last()
            .and_then(|path| Self::parse_timestamp(path))
            .unwrap_or(0);

        Ok(Self {
            dir: dir.to_path_buf(),
            last_timestamp,
        })
    }

    /// Load the latest snapshot, or an empty state if there is none
    pub fn restore(&self) -> Result<StateStore> {
        let Some(path) = self.latest()? else {
            tracing::info!("No snapshot found in {}, starting empty", self.dir.display());
            return Ok(StateStore::new());
        };

        let bytes = fs::read(&path).map_err(|e| {
            RelayError::Snapshot(format!("cannot read {}: {}", path.display(), e))
        })?;

        let pairs: Vec<(String, String)> = serde_json::from_slice(&bytes).map_err(|e| {
            RelayError::Serialization(format!("invalid snapshot {}: {}", path.display(), e))
        })?;

        let state: StateStore = pairs.into_iter().collect();
        tracing::info!(
            "Restored {} keys from snapshot {}",
            state.len(),
            path.display()
        );

        Ok(state)
    }

    /// Write the full state to a new snapshot file
    ///
    /// Written to a temporary name first, then renamed into place, so a
    /// partially written file never looks like a snapshot.
    pub fn write(&mut self, state: &StateStore) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            RelayError::Snapshot(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let timestamp = clock::next_timestamp(self.last_timestamp);
        let path = self.snapshot_path(timestamp);
        let tmp_path = path.with_extension("json.tmp");

        let pairs: Vec<(&str, &str)> = state.iter().collect();
        let bytes = serde_json::to_vec(&pairs)?;

        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)
        };
        write_tmp().map_err(|e| {
            RelayError::Snapshot(format!("cannot write {}: {}", path.display(), e))
        })?;

        self.last_timestamp = timestamp;
        tracing::info!("Wrote snapshot {} ({} keys)", path.display(), pairs.len());

        Ok(path)
    }

    /// Path of the newest snapshot, if any
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        Ok(self.list()?.pop())
    }

    /// All snapshot files, oldest first
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        Self::list_in(&self.dir)
    }

    /// Get the snapshot directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Snapshot files in `dir`, sorted by file name
    ///
    /// Names are timestamp-prefixed, so name order is chronological order.
    fn list_in(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && Self::parse_timestamp(&path).is_some() {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    fn snapshot_path(&self, timestamp: u64) -> PathBuf {
        self.dir.join(format!("{}{}", timestamp, SNAPSHOT_SUFFIX))
    }

    /// Extract the timestamp from `<digits>-snapshot.json`
    fn parse_timestamp(path: &Path) -> Option<u64> {
        let digits = path.file_name()?.to_str()?.strip_suffix(SNAPSHOT_SUFFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let parse = |name: &str| SnapshotManager::parse_timestamp(Path::new(name));

        assert_eq!(parse("1700000000000-snapshot.json"), Some(1_700_000_000_000));
        assert_eq!(parse("/data/snapshots/42-snapshot.json"), Some(42));
        assert_eq!(parse("-snapshot.json"), None);
        assert_eq!(parse("+42-snapshot.json"), None);
        assert_eq!(parse("42-snapshot.json.tmp"), None);
        assert_eq!(parse("42.kvslog"), None);
    }
}
