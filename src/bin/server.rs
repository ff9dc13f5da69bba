//! RelayKV Server Binary
//!
//! Starts the command worker and the TCP transport.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use relaykv::config::ConfigBuilder;
use relaykv::network::Server;
use relaykv::{Config, Engine, Runtime};
use tracing_subscriber::{fmt, EnvFilter};

/// RelayKV Server
#[derive(Parser, Debug)]
#[command(name = "relaykv-server")]
#[command(about = "In-memory key-value store with snapshots and an append log")]
#[command(version)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long, env = "RELAYKV_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (snapshots/ and logs/ live here)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Maximum concurrent connections
    #[arg(short, long)]
    max_connections: Option<usize>,

    /// Snapshot interval in milliseconds
    #[arg(long)]
    snapshot_interval_ms: Option<u64>,

    /// Disable periodic snapshots
    #[arg(long)]
    no_snapshots: bool,

    /// Disable the append log
    #[arg(long)]
    no_append_log: bool,
}

impl Args {
    fn into_config(self) -> relaykv::Result<Config> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let mut builder = ConfigBuilder::from_config(base);
        if let Some(dir) = self.data_dir {
            builder = builder.data_dir(dir);
        }
        if let Some(addr) = self.listen {
            builder = builder.listen_addr(addr);
        }
        if let Some(count) = self.max_connections {
            builder = builder.max_connections(count);
        }
        if let Some(ms) = self.snapshot_interval_ms {
            builder = builder.snapshot_interval(Duration::from_millis(ms));
        }
        if self.no_snapshots {
            builder = builder.snapshot_enabled(false);
        }
        if self.no_append_log {
            builder = builder.append_log_enabled(false);
        }

        Ok(builder.build())
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,relaykv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("RelayKV Server v{}", relaykv::VERSION);
    tracing::info!("Data directory: {}", config.data_dir.display());

    let engine = match Engine::open(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match Runtime::spawn(engine) {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start command worker: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, runtime.handle()) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{}", e);
            let _ = runtime.shutdown();
            std::process::exit(1);
        }
    };

    if let Err(e) = server.stop_on_signal() {
        tracing::error!("{}", e);
        let _ = runtime.shutdown();
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
    }

    if let Err(e) = runtime.shutdown() {
        tracing::error!("Shutdown failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
