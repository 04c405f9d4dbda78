//! Remote Client
//!
//! Stateless per call: every primitive is one request/response exchange.
//! Nothing is retried here; callers decide whether to repeat the
//! higher-level operation.

use std::sync::Arc;

use crate::backend::{KvBackend, KvCursor};
use crate::config::Config;
use crate::error::{Result, StateError};
use crate::protocol::{decode_entries, Command, Response, Status};

use super::{ConnectionSource, RemoteCursor};

/// Client for the remote key-value service
///
/// Cheap to clone; clones share one connection source.
#[derive(Clone)]
pub struct RemoteClient {
    source: Arc<ConnectionSource>,
    page_size: u32,
}

impl RemoteClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.backend_addr.is_empty() {
            return Err(StateError::Config("backend address is empty".to_string()));
        }
        if config.scan_page_size == 0 {
            return Err(StateError::Config(
                "scan page size must be positive".to_string(),
            ));
        }
        if config.pool_connections && config.max_idle_connections == 0 {
            return Err(StateError::Config(
                "pooling enabled with zero idle connections".to_string(),
            ));
        }

        Ok(Self {
            source: Arc::new(ConnectionSource::new(config)),
            page_size: config.scan_page_size,
        })
    }

    pub fn addr(&self) -> &str {
        self.source.addr()
    }

    pub fn connection_source(&self) -> &ConnectionSource {
        &self.source
    }

    /// Health check
    pub fn ping(&self) -> Result<()> {
        self.call(&Command::Ping).map(|_| ())
    }

    /// Issue a command; ERROR responses become `Backend` errors
    fn call(&self, command: &Command) -> Result<Response> {
        let response = self.source.call(command)?;
        match response.status {
            Status::Error => Err(StateError::Backend(response.error_message())),
            _ => Ok(response),
        }
    }

    /// One page of `[start, end)`, at most `limit` entries
    pub(crate) fn scan_page(
        &self,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let response = self.call(&Command::Scan {
            start: start.to_string(),
            end: end.to_string(),
            limit,
        })?;

        match (response.status, response.payload) {
            (Status::Ok, Some(payload)) => decode_entries(&payload),
            _ => Ok(Vec::new()),
        }
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl KvBackend for RemoteClient {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self.call(&Command::Get {
            key: key.to_string(),
        })?;

        match response.status {
            Status::Ok => Ok(Some(response.payload.unwrap_or_default())),
            _ => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let response = self.call(&Command::Set {
            key: key.to_string(),
            value: value.to_vec(),
        })?;

        match response.status {
            Status::Ok => Ok(()),
            status => Err(StateError::Backend(format!(
                "unexpected {:?} status for SET",
                status
            ))),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        // OK and NOT_FOUND both mean the key is gone
        self.call(&Command::Delete {
            key: key.to_string(),
        })
        .map(|_| ())
    }

    fn range(&self, start: &str, end: &str) -> Result<Box<dyn KvCursor>> {
        Ok(Box::new(RemoteCursor::new(self.clone(), start, end)))
    }

    fn drop_all(&self) -> Result<()> {
        self.call(&Command::Init).map(|_| ())
    }
}
