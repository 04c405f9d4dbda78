//! Connection Source
//!
//! Scopes every RPC to acquire → exchange → release. Without pooling each
//! call opens and closes its own connection; with pooling, healthy
//! connections go back to a bounded idle list.

use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, Response};

use super::ClientConnection;

/// Where client connections come from
pub struct ConnectionSource {
    addr: String,
    connect_timeout: Duration,
    request_timeout: Duration,

    /// Idle connections; `None` when pooling is disabled
    idle: Option<Mutex<Vec<ClientConnection>>>,
    max_idle: usize,
}

impl ConnectionSource {
    pub fn new(config: &Config) -> Self {
        Self {
            addr: config.backend_addr.clone(),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            idle: config
                .pool_connections
                .then(|| Mutex::new(Vec::with_capacity(config.max_idle_connections))),
            max_idle: config.max_idle_connections,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_pooled(&self) -> bool {
        self.idle.is_some()
    }

    /// Number of idle pooled connections
    pub fn idle_count(&self) -> usize {
        self.idle.as_ref().map(|idle| idle.lock().len()).unwrap_or(0)
    }

    fn connect(&self) -> Result<ClientConnection> {
        ClientConnection::open(&self.addr, self.connect_timeout, self.request_timeout)
    }

    /// Take an idle connection the peer has not closed, if any
    fn take_idle(&self) -> Option<ClientConnection> {
        let idle = self.idle.as_ref()?;
        loop {
            let conn = idle.lock().pop()?;
            if conn.is_reusable() {
                return Some(conn);
            }
            tracing::debug!("Discarding closed pooled connection to {}", self.addr);
        }
    }

    /// Return a healthy connection; dropped (closed) when not pooling or full
    fn release(&self, conn: ClientConnection) {
        if let Some(idle) = &self.idle {
            let mut idle = idle.lock();
            if idle.len() < self.max_idle {
                idle.push(conn);
            }
        }
    }

    /// Run one request/response exchange on a scoped connection
    ///
    /// A failed exchange is never resent, and its connection is dropped
    /// rather than pooled.
    pub fn call(&self, command: &Command) -> Result<Response> {
        let mut conn = match self.take_idle() {
            Some(conn) => conn,
            None => self.connect()?,
        };

        let response = conn.exchange(command)?;
        self.release(conn);
        Ok(response)
    }

    /// Close every idle connection
    pub fn clear(&self) {
        if let Some(idle) = &self.idle {
            idle.lock().clear();
        }
    }
}
