//! State Database Module
//!
//! The storage interface the transaction-management layer programs against,
//! and its implementation over a flat key-value backend.
//!
//! ## Responsibilities
//! - Multiplex many (store, namespace) pairs over one flat key space
//! - Encode versioned values into a tagged binary envelope
//! - Point reads, batch reads, paginated range scans
//! - Apply update batches and track the recovery savepoint
//!
//! ## Key Layout
//! ```text
//! ┌────────────┬─────┬─────────────┬─────┬──────────────────┐
//! │ store name │ \0  │  namespace  │ \0  │     user key     │
//! └────────────┴─────┴─────────────┴─────┴──────────────────┘
//! savepoint:  store \0 _ \0 last_save_point
//! ```

mod batch;
mod encoding;
mod keys;
mod provider;
mod scanner;
mod store;

pub use batch::{Update, UpdateBatch};
pub use encoding::{decode_value, encode_value, FORMAT_TAG};
pub use keys::{
    composite_key, namespace_end_key, savepoint_key, split_composite_key, COMPOSITE_KEY_SEP,
    NAMESPACE_END, SAVEPOINT_NAMESPACE,
};
pub use provider::StateDbProvider;
pub use scanner::KvScanner;
pub use store::VersionedStore;

use std::sync::Arc;

use crate::error::Result;
use crate::version::Height;

// =============================================================================
// Values
// =============================================================================

/// A value together with the height of the write that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub metadata: Option<Vec<u8>>,
    pub version: Height,
}

impl VersionedValue {
    pub fn new(value: impl Into<Vec<u8>>, version: Height) -> Self {
        Self {
            value: value.into(),
            metadata: None,
            version,
        }
    }

    pub fn with_metadata(
        value: impl Into<Vec<u8>>,
        metadata: impl Into<Vec<u8>>,
        version: Height,
    ) -> Self {
        Self {
            value: value.into(),
            metadata: Some(metadata.into()),
            version,
        }
    }
}

/// One record produced by a range scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedKv {
    pub namespace: String,
    pub key: String,
    pub value: VersionedValue,
}

/// Options recognised by range scans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Maximum number of records returned; 0 means unbounded
    pub limit: u32,
}

impl RangeOptions {
    pub fn with_limit(limit: u32) -> Self {
        Self { limit }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Forward-only, non-restartable sequence of scan results
pub trait ResultsIterator: Send {
    /// `Ok(None)` marks the end of the sequence
    fn next_result(&mut self) -> Result<Option<VersionedKv>>;

    /// Release the underlying cursor. Safe to call more than once.
    fn close(&mut self);
}

/// A results iterator that can hand out a resumption point
pub trait QueryResultsIterator: ResultsIterator {
    /// Peek the next key, close, and return it ("" when exhausted)
    fn bookmark_and_close(&mut self) -> Result<String>;
}

// =============================================================================
// Storage Interface
// =============================================================================

/// A versioned, namespaced state database
pub trait VersionedDb: Send + Sync {
    fn open(&self) -> Result<()>;

    fn close(&self);

    /// Content validation hook; this adapter trusts the caller
    fn validate_key_value(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Whether arbitrary byte strings are accepted as keys
    fn bytes_key_supported(&self) -> bool;

    fn get_state(&self, namespace: &str, key: &str) -> Result<Option<VersionedValue>>;

    fn get_version(&self, namespace: &str, key: &str) -> Result<Option<Height>>;

    fn get_state_multiple_keys(
        &self,
        namespace: &str,
        keys: &[&str],
    ) -> Result<Vec<Option<VersionedValue>>>;

    /// `start_key` is inclusive, `end_key` exclusive; an empty `end_key`
    /// scans to the end of the namespace
    fn get_state_range_scan_iterator(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn ResultsIterator>>;

    fn get_state_range_scan_iterator_with_options(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
        options: RangeOptions,
    ) -> Result<Box<dyn QueryResultsIterator>>;

    fn execute_query(&self, namespace: &str, query: &str) -> Result<Box<dyn ResultsIterator>>;

    fn execute_query_with_options(
        &self,
        namespace: &str,
        query: &str,
        options: RangeOptions,
    ) -> Result<Box<dyn QueryResultsIterator>>;

    /// Apply all updates, then record `height` as the savepoint if present
    fn apply_updates(&self, batch: &UpdateBatch, height: Option<Height>) -> Result<()>;

    fn get_latest_save_point(&self) -> Result<Option<Height>>;
}

/// Hands out versioned databases that share one physical backend
pub trait VersionedDbProvider {
    fn get_db_handle(&self, name: &str) -> Result<Arc<dyn VersionedDb>>;

    fn close(&self);
}
