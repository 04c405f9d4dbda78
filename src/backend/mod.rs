//! Backend Module
//!
//! The flat key-value primitives a versioned store is built on.
//!
//! ## Variants
//! - `RemoteClient` (in `client`): key-value service reached over TCP
//! - `MemoryBackend`: embedded BTreeMap, also the engine behind the
//!   bundled development server
//!
//! Keys are text; values are opaque bytes. Absence is `Ok(None)`, never an
//! error.

mod memory;

pub use memory::{MemoryBackend, MemoryCursor, CURSOR_PAGE_SIZE};

use crate::error::Result;

/// Flat key-value primitives shared by every logical store
pub trait KvBackend: Send + Sync {
    /// Point lookup; `Ok(None)` when the key does not exist
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Upsert
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove; deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Forward cursor over `[start, end)` in lexicographic key order
    fn range(&self, start: &str, end: &str) -> Result<Box<dyn KvCursor>>;

    /// Drop every key in the backend. Test teardown only.
    fn drop_all(&self) -> Result<()>;
}

/// Forward cursor over a key range
pub trait KvCursor: Send {
    /// `Ok(None)` once the range is exhausted
    fn next_entry(&mut self) -> Result<Option<(String, Vec<u8>)>>;

    /// Release resources held by the cursor. Idempotent.
    fn close(&mut self);
}
