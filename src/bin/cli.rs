//! RelayKV CLI Client
//!
//! Sends commands to a RelayKV server and prints the responses.

use std::io::{self, BufRead};
use std::time::Duration;

use clap::Parser;
use relaykv::network::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// RelayKV CLI
#[derive(Parser, Debug)]
#[command(name = "relaykv-cli")]
#[command(about = "CLI for the RelayKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    /// Connection attempts before giving up
    #[arg(long, default_value = "5")]
    attempts: u32,

    /// Delay between connection attempts in milliseconds
    #[arg(long, default_value = "1000")]
    retry_delay_ms: u64,

    /// Command to send once, e.g. -c 'set user:1 "Violet Evergarden"'.
    /// Without it, commands are read from stdin, one per line.
    #[arg(short, long)]
    command: Option<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    eprintln!("Connecting to {}...", args.server);
    let mut client = match Client::connect(
        &args.server,
        args.attempts,
        Duration::from_millis(args.retry_delay_ms),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Some(command) = &args.command {
        match client.request(command) {
            Ok(response) => println!("{}", response),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    eprintln!("Enter your commands...");
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        };

        match client.request(&line) {
            Ok(response) => println!("{}", response),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
