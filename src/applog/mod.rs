//! Append Log Module
//!
//! Write-only audit trail of mutating commands.
//!
//! ## Responsibilities
//! - Append each mutating command verbatim, one per line
//! - Rotate to a fresh file once the current one is full
//! - Never read back: the log is not replayed on startup
//!
//! ## File Layout
//! ```text
//! {data_dir}/logs/
//!   ├── 1700000000000.kvslog   (closed, threshold + 1 entries)
//!   └── 1700000004211.kvslog   (open)
//!
//! set user:1 Violet\n
//! delete user:2\n
//! set user:3 "Violet Evergarden"\n
//! ```

mod writer;

pub use writer::AppendLog;

/// Extension of append log files
pub const LOG_EXTENSION: &str = "kvslog";
