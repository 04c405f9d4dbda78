//! In-memory backend
//!
//! BTreeMap-based engine with RwLock for concurrency.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

use super::{KvBackend, KvCursor};

/// Entries copied out of the map per cursor refill
pub const CURSOR_PAGE_SIZE: usize = 128;

/// Ordered in-process key-value engine
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Up to `limit` entries of `[start, end)` in key order (0 = no limit)
    pub fn scan(&self, start: &str, end: &str, limit: usize) -> Vec<(String, Vec<u8>)> {
        if start >= end {
            return Vec::new();
        }

        let data = self.data.read();
        let range = data.range::<str, _>((Bound::Included(start), Bound::Excluded(end)));
        let take = if limit == 0 { usize::MAX } else { limit };

        range
            .take(take)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Paged cursor over `[start, end)`
    pub fn cursor(&self, start: &str, end: &str) -> MemoryCursor {
        MemoryCursor {
            backend: self.clone(),
            next_start: start.to_string(),
            end: end.to_string(),
            buffered: VecDeque::new(),
            exhausted: start >= end,
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn range(&self, start: &str, end: &str) -> Result<Box<dyn KvCursor>> {
        Ok(Box::new(self.cursor(start, end)))
    }

    fn drop_all(&self) -> Result<()> {
        self.data.write().clear();
        Ok(())
    }
}

/// Cursor over a key range, refilled one page at a time
///
/// The read lock is held only while a page is copied, so writes made while
/// the cursor is open may show up in later pages.
pub struct MemoryCursor {
    backend: MemoryBackend,
    next_start: String,
    end: String,
    buffered: VecDeque<(String, Vec<u8>)>,
    exhausted: bool,
}

impl MemoryCursor {
    fn fetch_page(&mut self) {
        let page = self.backend.scan(&self.next_start, &self.end, CURSOR_PAGE_SIZE);

        match page.last() {
            Some((last_key, _)) => {
                let mut successor = last_key.clone();
                successor.push('\u{0}');
                self.next_start = successor;
            }
            None => self.exhausted = true,
        }

        self.buffered.extend(page);
    }

    /// Entries copied out but not yet returned
    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }
}

impl KvCursor for MemoryCursor {
    fn next_entry(&mut self) -> Result<Option<(String, Vec<u8>)>> {
        if self.buffered.is_empty() && !self.exhausted {
            self.fetch_page();
        }
        Ok(self.buffered.pop_front())
    }

    fn close(&mut self) {
        self.buffered.clear();
        self.exhausted = true;
    }
}
