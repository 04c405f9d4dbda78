//! Configuration for statekv
//!
//! Centralized configuration with sensible defaults. One `Config` covers both
//! the adapter side (which backend, how to reach it) and the bundled
//! development backend server.

use std::time::Duration;

/// Which key-value engine the store provider talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote key-value service reached over TCP
    Remote,

    /// Embedded in-process engine (no network)
    Memory,
}

/// Main configuration for a statekv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Backend Selection
    // -------------------------------------------------------------------------
    /// Backend variant handed to every versioned store
    pub backend: BackendKind,

    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Address of the remote key-value service (host:port)
    pub backend_addr: String,

    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read/write timeout applied to one request/response exchange (milliseconds)
    pub request_timeout_ms: u64,

    /// Keep healthy connections in an idle pool instead of closing them per call
    pub pool_connections: bool,

    /// Upper bound on idle pooled connections
    pub max_idle_connections: usize,

    /// Entries fetched per range-scan RPC
    pub scan_page_size: u32,

    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address of the development backend
    pub listen_addr: String,

    /// Worker threads serving client connections
    pub worker_threads: usize,

    /// Served connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Served connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Remote,
            backend_addr: "127.0.0.1:50051".to_string(),
            connect_timeout_ms: 1000,
            request_timeout_ms: 1000,
            pool_connections: false,
            max_idle_connections: 8,
            scan_page_size: 256,
            listen_addr: "127.0.0.1:50051".to_string(),
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Select the backend variant
    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend = kind;
        self
    }

    /// Set the remote backend address
    pub fn backend_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.backend_addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the per-request timeout (in milliseconds)
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    /// Enable or disable connection pooling
    pub fn pool_connections(mut self, enabled: bool) -> Self {
        self.config.pool_connections = enabled;
        self
    }

    /// Set the maximum number of idle pooled connections
    pub fn max_idle_connections(mut self, count: usize) -> Self {
        self.config.max_idle_connections = count;
        self
    }

    /// Set the number of entries fetched per range-scan RPC
    pub fn scan_page_size(mut self, size: u32) -> Self {
        self.config.scan_page_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of server worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
