//! Versioned store
//!
//! One logical database over a shared backend. Holds nothing but its name
//! and a backend handle, so it is freely shared across threads; concurrency
//! control belongs to the backend.

use std::sync::Arc;

use crate::backend::KvBackend;
use crate::error::{Result, StateError};
use crate::version::Height;

use super::encoding::{decode_value, encode_value};
use super::keys::{
    composite_key, namespace_end_key, savepoint_key, validate_namespace, validate_store_name,
};
use super::{
    KvScanner, QueryResultsIterator, RangeOptions, ResultsIterator, Update, UpdateBatch,
    VersionedDb, VersionedValue,
};

/// A named versioned database
pub struct VersionedStore {
    name: String,
    backend: Arc<dyn KvBackend>,
}

impl VersionedStore {
    pub fn new(name: &str, backend: Arc<dyn KvBackend>) -> Result<Self> {
        validate_store_name(name)?;
        Ok(Self {
            name: name.to_string(),
            backend,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a scanner over `[start_key, end_key)` within `namespace`
    pub fn range_scanner(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
        limit: u32,
    ) -> Result<KvScanner> {
        validate_namespace(namespace)?;

        let start = composite_key(&self.name, namespace, start_key);
        let end = if end_key.is_empty() {
            namespace_end_key(&self.name, namespace)
        } else {
            composite_key(&self.name, namespace, end_key)
        };

        tracing::debug!(
            "Range scan on [{}]: ns={}, start={:?}, end={:?}, limit={}",
            self.name,
            namespace,
            start_key,
            end_key,
            limit
        );

        let cursor = self.backend.range(&start, &end)?;
        Ok(KvScanner::new(namespace, cursor, limit))
    }

    fn unsupported(&self, what: &str) -> StateError {
        StateError::Unsupported(format!("{} not supported by store [{}]", what, self.name))
    }
}

impl VersionedDb for VersionedStore {
    fn open(&self) -> Result<()> {
        // The backend is shared; nothing to open per store
        Ok(())
    }

    fn close(&self) {}

    fn validate_key_value(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn bytes_key_supported(&self) -> bool {
        false
    }

    fn get_state(&self, namespace: &str, key: &str) -> Result<Option<VersionedValue>> {
        tracing::debug!("GetState on [{}]: ns={}, key={}", self.name, namespace, key);
        validate_namespace(namespace)?;

        let composite = composite_key(&self.name, namespace, key);
        match self.backend.get(&composite)? {
            Some(raw) => decode_value(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn get_version(&self, namespace: &str, key: &str) -> Result<Option<Height>> {
        Ok(self.get_state(namespace, key)?.map(|vv| vv.version))
    }

    fn get_state_multiple_keys(
        &self,
        namespace: &str,
        keys: &[&str],
    ) -> Result<Vec<Option<VersionedValue>>> {
        keys.iter()
            .map(|key| self.get_state(namespace, key))
            .collect()
    }

    fn get_state_range_scan_iterator(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn ResultsIterator>> {
        Ok(Box::new(self.range_scanner(namespace, start_key, end_key, 0)?))
    }

    fn get_state_range_scan_iterator_with_options(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
        options: RangeOptions,
    ) -> Result<Box<dyn QueryResultsIterator>> {
        Ok(Box::new(self.range_scanner(
            namespace,
            start_key,
            end_key,
            options.limit,
        )?))
    }

    fn execute_query(&self, _namespace: &str, _query: &str) -> Result<Box<dyn ResultsIterator>> {
        Err(self.unsupported("ExecuteQuery"))
    }

    fn execute_query_with_options(
        &self,
        _namespace: &str,
        _query: &str,
        _options: RangeOptions,
    ) -> Result<Box<dyn QueryResultsIterator>> {
        Err(self.unsupported("ExecuteQueryWithOptions"))
    }

    fn apply_updates(&self, batch: &UpdateBatch, height: Option<Height>) -> Result<()> {
        let namespaces = batch.updated_namespaces();

        // Reject the whole batch before the first write
        for ns in &namespaces {
            validate_namespace(ns)?;
        }

        for ns in namespaces {
            for (key, update) in batch.updates(ns) {
                let composite = composite_key(&self.name, ns, key);
                tracing::debug!("Store [{}]: applying ns={}, key={}", self.name, ns, key);

                match update {
                    Update::Delete { .. } => self.backend.delete(&composite)?,
                    Update::Put(vv) => {
                        let encoded = encode_value(vv)?;
                        self.backend.set(&composite, &encoded)?;
                    }
                }
            }
        }

        // Savepoint only after every data write. No height marks an
        // old-block backfill, which leaves the savepoint where it is.
        if let Some(height) = height {
            self.backend
                .set(&savepoint_key(&self.name), &height.to_bytes())?;
            tracing::debug!("Store [{}]: savepoint recorded at {}", self.name, height);
        }

        Ok(())
    }

    fn get_latest_save_point(&self) -> Result<Option<Height>> {
        match self.backend.get(&savepoint_key(&self.name))? {
            Some(bytes) => Height::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }
}
