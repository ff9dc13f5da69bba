//! TCP Client
//!
//! Blocking request/response client used by the CLI and tests.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{RelayError, Result};

use super::{trim_line_ending, with_retry};

/// Client connection to a RelayKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect, retrying up to `attempts` times with `delay` in between
    pub fn connect(addr: &str, attempts: u32, delay: Duration) -> Result<Self> {
        let stream = with_retry(addr, attempts, delay, || TcpStream::connect(addr))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command line and wait for its response line
    pub fn request(&mut self, command: &str) -> Result<String> {
        if command.contains('\n') {
            return Err(RelayError::Network(
                "a command must fit on one line".to_string(),
            ));
        }

        writeln!(self.writer, "{}", command)?;
        self.writer.flush()?;

        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Err(RelayError::Network("server closed the connection".to_string()));
        }

        Ok(String::from_utf8_lossy(trim_line_ending(&line)).into_owned())
    }
}
