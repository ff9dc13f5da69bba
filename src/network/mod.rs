//! Network Module
//!
//! Line-oriented TCP transport in front of the command runtime.
//!
//! ## Architecture
//! - Non-blocking acceptor loop polling a shutdown flag
//! - One reader thread and one writer thread per connection
//! - Commands routed through the single runtime worker
//!
//! One UTF-8 command per `\n`-terminated line in, one response line out.
//! A line that is not valid UTF-8 is answered with `ERR` and never parsed.

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::Server;

use std::io;
use std::thread;
use std::time::Duration;

use crate::error::{RelayError, Result};

/// Run `op` up to `attempts` times with a fixed `delay` between failures
///
/// Exhausting every attempt yields [`RelayError::TransportConnect`].
pub fn with_retry<T>(
    addr: &str,
    attempts: u32,
    delay: Duration,
    mut op: impl FnMut() -> io::Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("Attempt {}/{} to reach {} failed: {}", attempt, attempts, addr, e);
                if attempt < attempts {
                    thread::sleep(delay);
                }
            }
        }
    }

    Err(RelayError::TransportConnect {
        addr: addr.to_string(),
        attempts,
    })
}

/// Errors that just mean the peer went away
fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
