//! # RelayKV
//!
//! An in-memory key-value store driven by text commands, with:
//! - A small command grammar (`get`, `delete`, `set`)
//! - Periodic full-state snapshots restored on startup
//! - A rotating, write-only append log of mutating commands
//! - A single worker thread applying commands in arrival order
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Transport (TCP, line based)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ raw text / response text
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Runtime (one worker thread)                   │
//! │           inbound queue  +  snapshot ticker                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │   parse ─► StateStore::apply ─► AppendLog::record (mutating) │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │   Append Log    │            │    Snapshots    │
//!   │ logs/*.kvslog   │            │ snapshots/*.json│
//!   └─────────────────┘            └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod state;
pub mod applog;
pub mod snapshot;
pub mod engine;
pub mod runtime;
pub mod network;

mod clock;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RelayError, Result};
pub use config::Config;
pub use engine::Engine;
pub use runtime::{Runtime, RuntimeHandle};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RelayKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
