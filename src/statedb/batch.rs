//! Update batches
//!
//! The caller builds and owns a batch; a store only reads it while applying.

use std::collections::BTreeMap;

use crate::version::Height;

use super::VersionedValue;

/// A pending write to one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Upsert the value
    Put(VersionedValue),

    /// Tombstone: remove the key
    Delete { version: Height },
}

impl Update {
    pub fn version(&self) -> Height {
        match self {
            Update::Put(vv) => vv.version,
            Update::Delete { version } => *version,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Update::Delete { .. })
    }
}

/// Namespace → key → update, both levels kept in key order
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    updates: BTreeMap<String, BTreeMap<String, Update>>,
}

impl UpdateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, namespace: &str, key: &str, value: impl Into<Vec<u8>>, version: Height) {
        self.insert(namespace, key, Update::Put(VersionedValue::new(value, version)));
    }

    pub fn put_with_metadata(
        &mut self,
        namespace: &str,
        key: &str,
        value: impl Into<Vec<u8>>,
        metadata: impl Into<Vec<u8>>,
        version: Height,
    ) {
        let vv = VersionedValue::with_metadata(value, metadata, version);
        self.insert(namespace, key, Update::Put(vv));
    }

    pub fn delete(&mut self, namespace: &str, key: &str, version: Height) {
        self.insert(namespace, key, Update::Delete { version });
    }

    /// Later updates to the same key replace earlier ones
    pub fn insert(&mut self, namespace: &str, key: &str, update: Update) {
        self.updates
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), update);
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&Update> {
        self.updates.get(namespace).and_then(|ns| ns.get(key))
    }

    pub fn exists(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Namespaces touched by this batch, sorted
    pub fn updated_namespaces(&self) -> Vec<&str> {
        self.updates.keys().map(String::as_str).collect()
    }

    /// Updates for one namespace in key order
    pub fn updates(&self, namespace: &str) -> impl Iterator<Item = (&str, &Update)> {
        self.updates
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.iter().map(|(k, u)| (k.as_str(), u)))
    }

    /// Total number of key updates across all namespaces
    pub fn len(&self) -> usize {
        self.updates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
