//! Timestamps for data file names.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Next file timestamp, strictly greater than `last`
///
/// Two files created within the same millisecond would otherwise share a name.
pub fn next_timestamp(last: u64) -> u64 {
    unix_millis().max(last + 1)
}
