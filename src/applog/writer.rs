//! Append Log Writer
//!
//! Handles appending raw commands and rotating log files.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::clock;
use crate::error::{RelayError, Result};

use super::LOG_EXTENSION;

/// Writes raw commands to a rotating set of log files
pub struct AppendLog {
    /// Directory holding all log files
    dir: PathBuf,

    /// Path of the currently open file
    path: PathBuf,

    /// Buffered handle to the currently open file
    writer: BufWriter<File>,

    /// Entries written to the current file
    entries_in_file: usize,

    /// Once more than this many entries are in a file, the next record rotates
    rotation_threshold: usize,

    /// Timestamp of the current file name
    timestamp: u64,
}

impl AppendLog {
    /// Create the log directory if needed and open a fresh log file
    pub fn open(dir: &Path, rotation_threshold: usize) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            RelayError::AppendLog(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let timestamp = clock::next_timestamp(0);
        let (path, writer) = Self::open_file(dir, timestamp)?;

        tracing::debug!("Opened append log {}", path.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            path,
            writer,
            entries_in_file: 0,
            rotation_threshold,
            timestamp,
        })
    }

    /// Append one raw command
    ///
    /// Rotates first when the current file already holds more than
    /// `rotation_threshold` entries.
    pub fn record(&mut self, raw: &str) -> Result<()> {
        if self.entries_in_file > self.rotation_threshold {
            self.rotate()?;
        }

        writeln!(self.writer, "{}", raw)
            .and_then(|_| self.writer.flush())
            .map_err(|e| {
                RelayError::AppendLog(format!("cannot write {}: {}", self.path.display(), e))
            })?;

        self.entries_in_file += 1;
        Ok(())
    }

    /// Close the current file and open a new timestamp-named one
    pub fn rotate(&mut self) -> Result<()> {
        self.sync()?;

        let timestamp = clock::next_timestamp(self.timestamp);
        let (path, writer) = Self::open_file(&self.dir, timestamp)?;

        tracing::debug!(
            "Rotated append log {} -> {} after {} entries",
            self.path.display(),
            path.display(),
            self.entries_in_file
        );

        // Dropping the old writer closes the previous file
        self.writer = writer;
        self.path = path;
        self.timestamp = timestamp;
        self.entries_in_file = 0;

        Ok(())
    }

    /// Force buffered entries to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_all())
            .map_err(|e| {
                RelayError::AppendLog(format!("cannot sync {}: {}", self.path.display(), e))
            })
    }

    /// Flush and close the current file
    pub fn close(mut self) -> Result<()> {
        self.sync()?;
        tracing::debug!("Closed append log {}", self.path.display());
        Ok(())
    }

    /// Path of the currently open file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries written to the currently open file
    pub fn entries_in_file(&self) -> usize {
        self.entries_in_file
    }

    fn open_file(dir: &Path, timestamp: u64) -> Result<(PathBuf, BufWriter<File>)> {
        let path = dir.join(format!("{}.{}", timestamp, LOG_EXTENSION));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                RelayError::AppendLog(format!("cannot open {}: {}", path.display(), e))
            })?;
        Ok((path, BufWriter::new(file)))
    }
}
