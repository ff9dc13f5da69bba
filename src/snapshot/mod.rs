//! Snapshot Module
//!
//! Point-in-time copies of the full state, used to seed the state on startup.
//!
//! ## Responsibilities
//! - Discover existing snapshot files
//! - Restore the latest one (greatest file name) on startup
//! - Write new snapshots named by a strictly increasing timestamp
//! - Never modify or delete a snapshot once written
//!
//! ## File Format
//! ```text
//! {data_dir}/snapshots/1700000000000-snapshot.json
//!
//! [["user:1","Violet"],["user:2","Gilbert Bougainvillea"]]
//! ```
//! Pairs are written in key order.

mod manager;

pub use manager::SnapshotManager;

/// Suffix shared by all snapshot file names
pub const SNAPSHOT_SUFFIX: &str = "-snapshot.json";
