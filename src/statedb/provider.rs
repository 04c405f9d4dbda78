//! Store provider
//!
//! Owns the one backend handle and gives out lightweight per-name stores
//! that share it.

use std::sync::Arc;

use crate::backend::{KvBackend, MemoryBackend};
use crate::client::RemoteClient;
use crate::config::{BackendKind, Config};
use crate::error::Result;

use super::{VersionedDb, VersionedDbProvider, VersionedStore};

/// Provider of versioned stores over one physical backend
pub struct StateDbProvider {
    backend: Arc<dyn KvBackend>,
}

impl StateDbProvider {
    /// Build the backend selected by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let backend: Arc<dyn KvBackend> = match config.backend {
            BackendKind::Remote => {
                tracing::info!("Using remote key-value backend at {}", config.backend_addr);
                Arc::new(RemoteClient::new(config)?)
            }
            BackendKind::Memory => {
                tracing::info!("Using in-memory key-value backend");
                Arc::new(MemoryBackend::new())
            }
        };
        Ok(Self { backend })
    }

    pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    /// Concrete handle to the store named `name`
    pub fn store(&self, name: &str) -> Result<VersionedStore> {
        VersionedStore::new(name, Arc::clone(&self.backend))
    }

    /// Drop every key of every store. Test teardown only.
    pub fn drop_all(&self) -> Result<()> {
        tracing::warn!("Dropping all data in the backend");
        self.backend.drop_all()
    }
}

impl VersionedDbProvider for StateDbProvider {
    fn get_db_handle(&self, name: &str) -> Result<Arc<dyn VersionedDb>> {
        Ok(Arc::new(self.store(name)?))
    }

    fn close(&self) {
        tracing::debug!("Closing state database provider");
    }
}
