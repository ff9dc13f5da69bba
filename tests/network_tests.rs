//! Tests for the TCP transport
//!
//! These tests verify:
//! - One response line per command line
//! - Connection limits
//! - Bounded connect retry

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use relaykv::config::Config;
use relaykv::network::{Client, Server};
use relaykv::{Engine, RelayError, Runtime};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    _temp: TempDir,
    addr: String,
    server: Arc<Server>,
    acceptor: JoinHandle<()>,
    runtime: Runtime,
}

impl TestServer {
    fn start(max_connections: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let config = Config::builder()
            .data_dir(temp.path())
            .snapshot_enabled(false)
            .listen_addr("127.0.0.1:0")
            .max_connections(max_connections)
            .build();

        let runtime = Runtime::spawn(Engine::open(config.clone()).unwrap()).unwrap();
        let server = Arc::new(Server::bind(config, runtime.handle()).unwrap());
        let addr = server.local_addr().unwrap().to_string();

        let acceptor = {
            let server = Arc::clone(&server);
            thread::spawn(move || server.run().unwrap())
        };

        Self {
            _temp: temp,
            addr,
            server,
            acceptor,
            runtime,
        }
    }

    fn client(&self) -> Client {
        Client::connect(&self.addr, 3, Duration::from_millis(50)).unwrap()
    }

    fn stop(self) {
        self.server.shutdown_flag().store(true, Ordering::Relaxed);
        self.acceptor.join().unwrap();
        self.runtime.shutdown().unwrap();
    }
}

// =============================================================================
// Request/Response Tests
// =============================================================================

#[test]
fn test_scenario_over_tcp() {
    let server = TestServer::start(16);
    let mut client = server.client();

    let responses: Vec<String> = ["set a 1", "set a 2", "get a", "delete a", "get a"]
        .iter()
        .map(|raw| client.request(raw).unwrap())
        .collect();
    assert_eq!(responses, vec!["OK 1", "OK 0", "OK 2", "OK 1", "-OK"]);

    assert_eq!(
        client.request(r#"set user:1 "Violet Evergarden""#).unwrap(),
        "OK 1"
    );
    assert_eq!(client.request("get user:1").unwrap(), "OK Violet Evergarden");

    drop(client);
    server.stop();
}

#[test]
fn test_empty_line_gets_err() {
    let server = TestServer::start(16);
    let mut client = server.client();

    assert_eq!(client.request("").unwrap(), "ERR No command was provided.");

    drop(client);
    server.stop();
}

#[test]
fn test_pipelined_lines_with_crlf() {
    let server = TestServer::start(16);
    let mut stream = TcpStream::connect(&server.addr).unwrap();

    stream.write_all(b"set a 1\r\nget a\r\nnani\n").unwrap();

    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut responses = Vec::new();
    for _ in 0..3 {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        responses.push(line);
    }

    assert_eq!(
        responses,
        vec![
            "OK 1\n",
            "OK 1\n",
            "ERR Invalid command. Must be one of get, delete, set.\n"
        ]
    );

    drop(stream);
    server.stop();
}

#[test]
fn test_invalid_utf8_line_rejected_in_order() {
    let server = TestServer::start(16);
    let mut stream = TcpStream::connect(&server.addr).unwrap();

    stream.write_all(b"set a 1\nset b \xff\xfe\nget b\nget a\n").unwrap();

    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut responses = Vec::new();
    for _ in 0..4 {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        responses.push(line);
    }

    assert_eq!(
        responses,
        vec![
            "OK 1\n",
            "ERR Command is not valid UTF-8.\n",
            "-OK\n",
            "OK 1\n"
        ]
    );

    drop(stream);
    server.stop();
}

#[test]
fn test_clients_share_state() {
    let server = TestServer::start(16);
    let mut writer = server.client();
    let mut reader = server.client();

    writer.request("set shared yes").unwrap();
    assert_eq!(reader.request("get shared").unwrap(), "OK yes");

    drop(writer);
    drop(reader);
    server.stop();
}

#[test]
fn test_connection_limit() {
    let server = TestServer::start(1);
    let mut first = server.client();
    assert_eq!(first.request("set a 1").unwrap(), "OK 1");

    let stream = TcpStream::connect(&server.addr).unwrap();
    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line).unwrap();
    assert_eq!(line, "ERR server busy\n");

    drop(first);
    server.stop();
}

#[test]
fn test_multiline_command_rejected_by_client() {
    let server = TestServer::start(16);
    let mut client = server.client();

    assert!(matches!(
        client.request("set a 1\nset b 2"),
        Err(RelayError::Network(_))
    ));

    drop(client);
    server.stop();
}

// =============================================================================
// Retry Tests
// =============================================================================

#[test]
fn test_client_connect_gives_up() {
    // Grab a free port, then close it so nothing listens there
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let result = Client::connect(&addr, 3, Duration::from_millis(10));

    assert!(matches!(
        result,
        Err(RelayError::TransportConnect { attempts: 3, .. })
    ));
}

#[test]
fn test_server_bind_gives_up_when_address_taken() {
    let temp = TempDir::new().unwrap();
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .listen_addr(taken.local_addr().unwrap().to_string())
        .connect_attempts(2)
        .connect_retry_delay(Duration::from_millis(10))
        .build();

    let runtime = Runtime::spawn(Engine::open(config.clone()).unwrap()).unwrap();
    let result = Server::bind(config, runtime.handle());

    assert!(matches!(
        result,
        Err(RelayError::TransportConnect { attempts: 2, .. })
    ));
    runtime.shutdown().unwrap();
}
