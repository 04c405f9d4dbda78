//! Range scanner
//!
//! Wraps a backend cursor: strips the composite-key prefix, decodes values,
//! enforces the requested limit and hands out resumption bookmarks.

use crate::backend::KvCursor;
use crate::error::Result;

use super::encoding::decode_value;
use super::keys::split_composite_key;
use super::{QueryResultsIterator, ResultsIterator, VersionedKv};

/// Results of one range scan over a namespace
///
/// The cursor is released on `close`, on `bookmark_and_close`, or on drop.
pub struct KvScanner {
    namespace: String,
    cursor: Box<dyn KvCursor>,
    /// 0 means unbounded
    requested_limit: u32,
    total_returned: u32,
    closed: bool,
}

impl KvScanner {
    pub(crate) fn new(namespace: &str, cursor: Box<dyn KvCursor>, requested_limit: u32) -> Self {
        Self {
            namespace: namespace.to_string(),
            cursor,
            requested_limit,
            total_returned: 0,
            closed: false,
        }
    }

    pub fn total_returned(&self) -> u32 {
        self.total_returned
    }

    fn limit_reached(&self) -> bool {
        self.requested_limit > 0 && self.total_returned >= self.requested_limit
    }

    fn next_raw(&mut self) -> Result<Option<(String, Vec<u8>)>> {
        if self.closed {
            return Ok(None);
        }
        self.cursor.next_entry()
    }
}

impl ResultsIterator for KvScanner {
    fn next_result(&mut self) -> Result<Option<VersionedKv>> {
        if self.limit_reached() {
            return Ok(None);
        }

        let Some((composite, raw)) = self.next_raw()? else {
            return Ok(None);
        };

        let (_, key) = split_composite_key(&composite)?;
        let value = decode_value(&raw)?;
        self.total_returned += 1;

        Ok(Some(VersionedKv {
            namespace: self.namespace.clone(),
            key: key.to_string(),
            value,
        }))
    }

    fn close(&mut self) {
        if !self.closed {
            self.cursor.close();
            self.closed = true;
        }
    }
}

impl QueryResultsIterator for KvScanner {
    fn bookmark_and_close(&mut self) -> Result<String> {
        let next = self.next_raw();
        self.close();

        match next? {
            Some((composite, _)) => Ok(split_composite_key(&composite)?.1.to_string()),
            None => Ok(String::new()),
        }
    }
}

impl Iterator for KvScanner {
    type Item = Result<VersionedKv>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result().transpose()
    }
}

impl Drop for KvScanner {
    fn drop(&mut self) {
        self.close();
    }
}
