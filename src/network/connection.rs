//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::thread;

use crossbeam::channel::{self, Receiver};

use crate::error::{RelayError, Result};
use crate::protocol::Response;
use crate::runtime::RuntimeHandle;

use super::{is_disconnect, trim_line_ending};

/// Reply text for lines that are not valid UTF-8
const INVALID_UTF8: &str = "Command is not valid UTF-8.";

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Queue into the command worker
    handle: RuntimeHandle,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, handle: RuntimeHandle) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            handle,
            peer_addr,
        })
    }

    /// Serve the connection until the client disconnects
    ///
    /// Each line read is submitted to the worker. Responses are written by a
    /// separate thread as they arrive, so reading never waits on a reply.
    pub fn handle(self) -> Result<()> {
        let Connection {
            mut reader,
            writer,
            handle,
            peer_addr,
        } = self;

        tracing::debug!("Connection established from {}", peer_addr);

        let (reply_tx, reply_rx) = channel::unbounded();
        let writer_peer = peer_addr.clone();
        let writer_thread = thread::Builder::new()
            .name(format!("relaykv-reply-{}", peer_addr))
            .spawn(move || write_responses(writer, reply_rx, &writer_peer))?;

        let mut line = Vec::new();
        let result = loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", peer_addr);
                    break Ok(());
                }
                Ok(_) => {
                    let queued = match std::str::from_utf8(trim_line_ending(&line)) {
                        Ok(raw) => {
                            tracing::trace!("Received from {}: {:?}", peer_addr, raw);
                            handle.submit(raw, reply_tx.clone())
                        }
                        Err(e) => {
                            tracing::debug!("Rejected non-UTF-8 line from {}: {}", peer_addr, e);
                            handle.reply(Response::error(INVALID_UTF8), reply_tx.clone())
                        }
                    };
                    if let Err(e) = queued {
                        break Err(e);
                    }
                }
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!("Connection reset by client {}", peer_addr);
                    break Ok(());
                }
                Err(e) => break Err(RelayError::Io(e)),
            }
        };

        // The writer finishes once the worker has answered every queued line
        drop(reply_tx);
        if writer_thread.join().is_err() {
            tracing::warn!("Reply writer for {} panicked", peer_addr);
        }

        result
    }
}

fn write_responses(mut writer: BufWriter<TcpStream>, replies: Receiver<String>, peer: &str) {
    for response in replies.iter() {
        let sent = writeln!(writer, "{}", response).and_then(|_| writer.flush());
        if let Err(e) = sent {
            if is_disconnect(&e) {
                tracing::debug!("Client {} disconnected before response could be sent", peer);
            } else {
                tracing::warn!("Error writing to {}: {}", peer, e);
            }
            return;
        }
    }
}
