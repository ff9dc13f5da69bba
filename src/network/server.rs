//! TCP Server
//!
//! Accepts connections and gives each one its own threads.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::runtime::RuntimeHandle;

use super::{with_retry, Connection};

/// TCP server for RelayKV
pub struct Server {
    config: Config,
    listener: TcpListener,
    handle: RuntimeHandle,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// How long the acceptor sleeps when no connection is pending
    const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Bind the listen address, retrying per the config
    pub fn bind(config: Config, handle: RuntimeHandle) -> Result<Self> {
        let listener = with_retry(
            &config.listen_addr,
            config.connect_attempts,
            config.connect_retry_delay,
            || TcpListener::bind(&config.listen_addr),
        )?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            handle,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Accept connections until the shutdown flag is set
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Self::ACCEPT_POLL_INTERVAL);
                }
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Flag that stops [`Server::run`] when set
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Set the shutdown flag on SIGINT or SIGTERM
    ///
    /// Only one handler can be installed per process.
    pub fn stop_on_signal(&self) -> Result<()> {
        let shutdown = self.shutdown_flag();
        ctrlc::set_handler(move || {
            tracing::info!("Received termination signal, initiating shutdown...");
            shutdown.store(true, Ordering::Relaxed);
        })
        .map_err(|e| RelayError::Signal(e.to_string()))
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn dispatch(&self, mut stream: TcpStream, peer: SocketAddr) {
        // Accepted sockets may inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: {}", peer, e);
            return;
        }

        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!("Rejecting {}: {} connections open", peer, self.config.max_connections);
            let _ = stream.write_all(b"ERR server busy\n");
            return;
        }

        let connection = match Connection::new(stream, self.handle.clone()) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                return;
            }
        };

        let guard = ActiveGuard::enter(&self.active);
        let spawned = thread::Builder::new()
            .name(format!("relaykv-conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = connection.handle() {
                    tracing::warn!("Connection {} ended with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn handler for {}: {}", peer, e);
        }
    }
}

/// Counts a connection as active until dropped
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(active))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
