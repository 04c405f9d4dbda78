//! Tests for RemoteClient against the development server
//!
//! Each test binds a server on an ephemeral port, runs the adapter over TCP,
//! then shuts the server down.

use std::io::BufReader;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use statekv::backend::{KvBackend, KvCursor, MemoryBackend};
use statekv::client::RemoteClient;
use statekv::config::{BackendKind, Config};
use statekv::network::{Server, ShutdownHandle};
use statekv::protocol::{read_command, write_response, Response};
use statekv::statedb::composite_key;
use statekv::{
    Height, QueryResultsIterator, RangeOptions, ResultsIterator, StateDbProvider, StateError,
    UpdateBatch, VersionedDb, VersionedDbProvider, VersionedValue,
};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: SocketAddr,
    backend: MemoryBackend,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let backend = MemoryBackend::new();
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .worker_threads(4)
            .read_timeout_ms(500)
            .build();

        let server = Server::bind(config, backend.clone()).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run().unwrap());

        Self {
            addr,
            backend,
            shutdown,
            thread: Some(thread),
        }
    }

    fn config(&self) -> Config {
        Config::builder()
            .backend(BackendKind::Remote)
            .backend_addr(self.addr.to_string())
            .build()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// An address nothing is listening on
fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// Answers the first command on each connection, then reads without replying
///
/// Returns the address plus counters of accepted connections and received
/// commands.
fn start_stalling_server() -> (String, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let connections = Arc::new(AtomicUsize::new(0));
    let commands = Arc::new(AtomicUsize::new(0));

    let (conn_count, cmd_count) = (connections.clone(), commands.clone());
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            conn_count.fetch_add(1, Ordering::SeqCst);
            let cmd_count = cmd_count.clone();
            thread::spawn(move || {
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut answered = false;
                while read_command(&mut reader).is_ok() {
                    cmd_count.fetch_add(1, Ordering::SeqCst);
                    if !answered {
                        write_response(&mut stream, &Response::ok(None)).unwrap();
                        answered = true;
                    }
                }
            });
        }
    });

    (addr, connections, commands)
}

fn collect_keys<I: ResultsIterator + ?Sized>(itr: &mut I) -> Vec<String> {
    let mut keys = Vec::new();
    while let Some(kv) = itr.next_result().unwrap() {
        keys.push(kv.key);
    }
    keys
}

// =============================================================================
// Primitive Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start();
    let client = RemoteClient::new(&server.config()).unwrap();

    client.ping().unwrap();
}

#[test]
fn test_get_set_delete() {
    let server = TestServer::start();
    let client = RemoteClient::new(&server.config()).unwrap();

    assert_eq!(client.get("k").unwrap(), None);

    client.set("k", b"v").unwrap();
    assert_eq!(client.get("k").unwrap(), Some(b"v".to_vec()));
    assert_eq!(server.backend.get("k").unwrap(), Some(b"v".to_vec()));

    client.delete("k").unwrap();
    assert_eq!(client.get("k").unwrap(), None);

    // Idempotent
    client.delete("k").unwrap();
}

#[test]
fn test_empty_value_is_present() {
    let server = TestServer::start();
    let client = RemoteClient::new(&server.config()).unwrap();

    client.set("empty", b"").unwrap();
    assert_eq!(client.get("empty").unwrap(), Some(Vec::new()));
}

#[test]
fn test_range_crosses_pages() {
    let server = TestServer::start();
    let config = Config::builder()
        .backend_addr(server.addr.to_string())
        .scan_page_size(3)
        .build();
    let client = RemoteClient::new(&config).unwrap();

    for i in 0..10 {
        server.backend.set(&format!("k{:02}", i), &[i as u8]).unwrap();
    }
    server.backend.set("z-outside", b"x").unwrap();

    let mut cursor = client.range("k00", "k99").unwrap();
    let mut keys = Vec::new();
    while let Some((key, value)) = cursor.next_entry().unwrap() {
        assert_eq!(value.len(), 1);
        keys.push(key);
    }
    cursor.close();

    let expected: Vec<String> = (0..10).map(|i| format!("k{:02}", i)).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_drop_all() {
    let server = TestServer::start();
    let client = RemoteClient::new(&server.config()).unwrap();

    client.set("a", b"1").unwrap();
    client.set("b", b"2").unwrap();
    client.drop_all().unwrap();

    assert!(server.backend.is_empty());
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_unreachable_backend_is_unavailable() {
    let config = Config::builder()
        .backend_addr(dead_addr())
        .connect_timeout_ms(200)
        .build();
    let provider = StateDbProvider::new(&config).unwrap();
    let db = provider.get_db_handle("channel1").unwrap();

    assert!(matches!(db.get_state("ns1", "k"), Err(StateError::Unavailable(_))));
    assert!(matches!(db.get_latest_save_point(), Err(StateError::Unavailable(_))));
}

#[test]
fn test_unreachable_backend_fails_scan_on_first_fetch() {
    let config = Config::builder()
        .backend_addr(dead_addr())
        .connect_timeout_ms(200)
        .build();
    let provider = StateDbProvider::new(&config).unwrap();
    let db = provider.get_db_handle("channel1").unwrap();

    let mut itr = db.get_state_range_scan_iterator("ns1", "", "").unwrap();
    assert!(matches!(itr.next_result(), Err(StateError::Unavailable(_))));
    itr.close();
}

#[test]
fn test_silent_backend_times_out() {
    // Accepts connections but never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config::builder()
        .backend_addr(addr.to_string())
        .request_timeout_ms(200)
        .build();
    let client = RemoteClient::new(&config).unwrap();

    assert!(matches!(client.get("k"), Err(StateError::Unavailable(_))));
    drop(listener);
}

#[test]
fn test_server_keeps_serving_after_abrupt_clients() {
    let server = TestServer::start();

    for _ in 0..8 {
        drop(std::net::TcpStream::connect(server.addr).unwrap());
    }

    let client = RemoteClient::new(&server.config()).unwrap();
    client.set("k", b"v").unwrap();
    assert_eq!(client.get("k").unwrap(), Some(b"v".to_vec()));
}

#[test]
fn test_timed_out_call_is_not_resent() {
    let (addr, connections, commands) = start_stalling_server();
    let config = Config::builder()
        .backend_addr(addr)
        .pool_connections(true)
        .request_timeout_ms(300)
        .build();
    let client = RemoteClient::new(&config).unwrap();

    client.set("a", b"1").unwrap();
    assert_eq!(client.connection_source().idle_count(), 1);

    let started = Instant::now();
    let result = client.set("b", b"2");
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(StateError::Unavailable(_))));
    assert!(elapsed < Duration::from_millis(550), "took {:?}", elapsed);

    // The failed connection is dropped, not pooled
    assert_eq!(client.connection_source().idle_count(), 0);

    thread::sleep(Duration::from_millis(100));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
    assert_eq!(commands.load(Ordering::SeqCst), 2);
}

#[test]
fn test_closed_pooled_connection_is_replaced() {
    let server = TestServer::start();
    let config = Config::builder()
        .backend_addr(server.addr.to_string())
        .pool_connections(true)
        .build();
    let client = RemoteClient::new(&config).unwrap();

    client.set("a", b"1").unwrap();
    assert_eq!(client.connection_source().idle_count(), 1);

    // Outlast the server's idle read timeout so it closes the connection
    thread::sleep(Duration::from_millis(800));

    client.set("b", b"2").unwrap();
    assert_eq!(client.get("a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(client.connection_source().idle_count(), 1);
}

// =============================================================================
// Versioned Store over TCP
// =============================================================================

#[test]
fn test_basic_scenario_remote() {
    let server = TestServer::start();
    let provider = StateDbProvider::new(&server.config()).unwrap();
    let db = provider.get_db_handle("channel1").unwrap();

    let mut batch = UpdateBatch::new();
    batch.put("ns1", "a", b"v1".to_vec(), Height::new(1, 0));
    batch.put("ns1", "b", b"v2".to_vec(), Height::new(1, 1));
    db.apply_updates(&batch, Some(Height::new(1, 1))).unwrap();

    assert_eq!(
        db.get_state("ns1", "a").unwrap(),
        Some(VersionedValue::new(b"v1".to_vec(), Height::new(1, 0)))
    );
    assert_eq!(db.get_latest_save_point().unwrap(), Some(Height::new(1, 1)));

    let mut itr = db.get_state_range_scan_iterator("ns1", "a", "c").unwrap();
    assert_eq!(collect_keys(itr.as_mut()), vec!["a", "b"]);

    assert!(server
        .backend
        .get(&composite_key("channel1", "ns1", "a"))
        .unwrap()
        .is_some());
}

#[test]
fn test_limit_and_bookmark_remote() {
    let server = TestServer::start();
    let config = Config::builder()
        .backend_addr(server.addr.to_string())
        .scan_page_size(4)
        .build();
    let provider = StateDbProvider::new(&config).unwrap();
    let db = provider.get_db_handle("channel1").unwrap();

    let mut batch = UpdateBatch::new();
    for i in 0..12 {
        batch.put("ns1", &format!("key_{:02}", i), vec![i as u8], Height::new(2, i));
    }
    db.apply_updates(&batch, Some(Height::new(2, 11))).unwrap();

    let mut itr = db
        .get_state_range_scan_iterator_with_options("ns1", "", "", RangeOptions::with_limit(5))
        .unwrap();
    let keys = collect_keys(itr.as_mut());

    assert_eq!(keys, vec!["key_00", "key_01", "key_02", "key_03", "key_04"]);
    assert_eq!(itr.bookmark_and_close().unwrap(), "key_05");
}

#[test]
fn test_tombstone_remote() {
    let server = TestServer::start();
    let provider = StateDbProvider::new(&server.config()).unwrap();
    let db = provider.get_db_handle("channel1").unwrap();

    let mut batch = UpdateBatch::new();
    batch.put("ns1", "k", b"v".to_vec(), Height::new(1, 0));
    db.apply_updates(&batch, Some(Height::new(1, 0))).unwrap();

    let mut batch = UpdateBatch::new();
    batch.delete("ns1", "k", Height::new(2, 0));
    db.apply_updates(&batch, None).unwrap();

    assert_eq!(db.get_state("ns1", "k").unwrap(), None);
    assert_eq!(db.get_latest_save_point().unwrap(), Some(Height::new(1, 0)));
}

#[test]
fn test_pooled_connections_are_reused() {
    let server = TestServer::start();
    let config = Config::builder()
        .backend_addr(server.addr.to_string())
        .pool_connections(true)
        .max_idle_connections(2)
        .build();
    let client = RemoteClient::new(&config).unwrap();

    for i in 0..20 {
        client.set(&format!("k{}", i), b"v").unwrap();
    }

    assert!(client.connection_source().is_pooled());
    assert_eq!(client.connection_source().idle_count(), 1);
    assert_eq!(server.backend.len(), 20);
}

#[test]
fn test_unpooled_connections_are_closed() {
    let server = TestServer::start();
    let client = RemoteClient::new(&server.config()).unwrap();

    client.set("k", b"v").unwrap();

    assert!(!client.connection_source().is_pooled());
    assert_eq!(client.connection_source().idle_count(), 0);
}

#[test]
fn test_concurrent_remote_writers() {
    let server = TestServer::start();
    let config = server.config();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let config = config.clone();
            thread::spawn(move || {
                let provider = StateDbProvider::new(&config).unwrap();
                let db = provider.get_db_handle("channel1").unwrap();
                let mut batch = UpdateBatch::new();
                for i in 0..10 {
                    batch.put(&format!("ns{}", t), &format!("k{}", i), b"v".to_vec(), Height::new(1, i));
                }
                db.apply_updates(&batch, None).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(server.backend.len(), 40);
}
