//! Command runtime
//!
//! Runs the [`Engine`] on one worker thread and feeds it from a queue.
//!
//! - **Worker thread**: owns the engine, applies commands in arrival order,
//!   and runs the snapshot timer
//! - **Handles**: cheap clones held by transports; they enqueue raw commands
//!   together with the destination their response should go to
//!
//! The worker waits on the inbound queue and the snapshot ticker with
//! `select!`. Whichever is ready first runs to completion. Log and snapshot
//! writes block the worker while they run, so a snapshot always sees the
//! state between two whole commands. Responses go out on independent
//! channels, and they may be observed out of order across destinations.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, select, Receiver, Sender};

use crate::engine::Engine;
use crate::error::{RelayError, Result};
use crate::protocol::Response;

/// Messages accepted by the worker
enum Inbound {
    /// A raw command and where to send its response
    Command {
        raw: String,
        reply_to: Sender<String>,
    },

    /// A response decided before reaching the engine, kept in queue order
    Reply {
        response: String,
        reply_to: Sender<String>,
    },

    /// Stop the worker; anything enqueued after this is dropped
    Shutdown,
}

/// Handle for submitting commands to a running worker
#[derive(Clone)]
pub struct RuntimeHandle {
    inbound_tx: Sender<Inbound>,
}

impl RuntimeHandle {
    /// Enqueue a raw command; its response is sent to `reply_to`
    pub fn submit(&self, raw: impl Into<String>, reply_to: Sender<String>) -> Result<()> {
        self.inbound_tx
            .send(Inbound::Command {
                raw: raw.into(),
                reply_to,
            })
            .map_err(|_| RelayError::RuntimeStopped)
    }

    /// Enqueue a ready-made response behind everything already submitted
    ///
    /// Used by transports to reject input that never reaches the parser
    /// without overtaking responses still in flight.
    pub fn reply(&self, response: Response, reply_to: Sender<String>) -> Result<()> {
        self.inbound_tx
            .send(Inbound::Reply {
                response: response.to_string(),
                reply_to,
            })
            .map_err(|_| RelayError::RuntimeStopped)
    }

    /// Enqueue a raw command and block until its response arrives
    pub fn request(&self, raw: impl Into<String>) -> Result<String> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        self.submit(raw, reply_tx)?;
        reply_rx.recv().map_err(|_| RelayError::RuntimeStopped)
    }
}

/// A running worker thread
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<Result<()>>,
}

impl Runtime {
    /// Move the engine onto a new worker thread
    pub fn spawn(engine: Engine) -> Result<Self> {
        let (inbound_tx, inbound_rx) = channel::unbounded();

        let worker = thread::Builder::new()
            .name("relaykv-worker".to_string())
            .spawn(move || Worker { engine, inbound_rx }.run())?;

        Ok(Self {
            handle: RuntimeHandle { inbound_tx },
            worker,
        })
    }

    /// Get a handle for submitting commands
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Stop the worker and wait for it to close the engine
    ///
    /// The stop marker joins the same queue as commands, so everything
    /// submitted before this call is still applied and answered. Commands
    /// submitted afterwards are dropped without a response.
    pub fn shutdown(self) -> Result<()> {
        // The worker may already be gone; joining reports why
        let _ = self.handle.inbound_tx.send(Inbound::Shutdown);

        match self.worker.join() {
            Ok(result) => result,
            Err(_) => Err(RelayError::RuntimeStopped),
        }
    }
}

/// Owns the engine for the lifetime of the thread
struct Worker {
    engine: Engine,
    inbound_rx: Receiver<Inbound>,
}

impl Worker {
    fn run(mut self) -> Result<()> {
        // Dropped when the loop exits, which cancels the timer
        let ticker = match self.engine.snapshot_interval() {
            Some(interval) => channel::tick(interval),
            None => channel::never(),
        };

        loop {
            select! {
                recv(self.inbound_rx) -> msg => match msg {
                    Ok(Inbound::Command { raw, reply_to }) => self.handle_command(&raw, &reply_to),
                    Ok(Inbound::Reply { response, reply_to }) => {
                        let _ = reply_to.send(response);
                    }
                    Ok(Inbound::Shutdown) => break,
                    Err(_) => break, // Every handle dropped
                },
                recv(ticker) -> _ => self.snapshot_tick(),
            }
        }

        tracing::info!("Command worker shutting down");
        self.engine.close()
    }

    /// Apply one command and send exactly one response
    fn handle_command(&mut self, raw: &str, reply_to: &Sender<String>) {
        let response = match self.engine.handle(raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Command {:?} failed: {}", raw, e);
                Response::error(e)
            }
        };

        // The requester may have gone away; nothing to do then
        let _ = reply_to.send(response.to_string());
    }

    fn snapshot_tick(&mut self) {
        if let Err(e) = self.engine.snapshot_tick() {
            tracing::error!("Snapshot failed: {}", e);
        }
    }
}
