//! Tests for server shutdown on termination signals
//!
//! Kept in its own test binary: a process can install only one signal
//! handler, and the signal is delivered to the whole test process.

#![cfg(unix)]

use std::fs;
use std::process::Command;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use relaykv::config::Config;
use relaykv::network::{Client, Server};
use relaykv::{Engine, Runtime};
use tempfile::TempDir;

fn send_signal(signal: &str) {
    let status = Command::new("kill")
        .args([signal, &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn test_sigterm_stops_server_and_closes_log() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .snapshot_enabled(false)
        .listen_addr("127.0.0.1:0")
        .build();

    let runtime = Runtime::spawn(Engine::open(config.clone()).unwrap()).unwrap();
    let server = Arc::new(Server::bind(config, runtime.handle()).unwrap());
    server.stop_on_signal().unwrap();
    let addr = server.local_addr().unwrap().to_string();

    let acceptor = {
        let server = Arc::clone(&server);
        thread::spawn(move || server.run().unwrap())
    };

    let mut client = Client::connect(&addr, 3, Duration::from_millis(50)).unwrap();
    assert_eq!(client.request("set a 1").unwrap(), "OK 1");
    drop(client);

    send_signal("-TERM");

    let deadline = Instant::now() + Duration::from_secs(5);
    while !server.shutdown_flag().load(Ordering::Relaxed) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(server.shutdown_flag().load(Ordering::Relaxed));

    acceptor.join().unwrap();
    runtime.shutdown().unwrap();

    let logs: Vec<String> = fs::read_dir(temp.path().join("logs"))
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert_eq!(logs, vec!["set a 1\n"]);
}
