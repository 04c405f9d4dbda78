//! Remote range cursor
//!
//! Walks `[start, end)` one SCAN page at a time. The next page starts just
//! past the last key received, so the server keeps no cursor state.

use std::collections::VecDeque;

use crate::backend::KvCursor;
use crate::error::Result;

use super::RemoteClient;

/// Forward cursor over a remote key range
pub struct RemoteCursor {
    client: RemoteClient,

    /// Inclusive start of the next page
    next_start: String,

    /// Exclusive end of the range
    end: String,

    /// Entries fetched but not yet returned
    buffered: VecDeque<(String, Vec<u8>)>,

    /// Set once the server returns an empty page, or after close
    exhausted: bool,
}

impl RemoteCursor {
    pub(crate) fn new(client: RemoteClient, start: &str, end: &str) -> Self {
        Self {
            client,
            next_start: start.to_string(),
            end: end.to_string(),
            buffered: VecDeque::new(),
            exhausted: start >= end,
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = self
            .client
            .scan_page(&self.next_start, &self.end, self.client.page_size())?;

        match page.last() {
            Some((last_key, _)) => {
                // Smallest string sorting after `last_key`
                let mut successor = last_key.clone();
                successor.push('\u{0}');
                self.next_start = successor;
            }
            None => self.exhausted = true,
        }

        self.buffered.extend(page);
        Ok(())
    }
}

impl KvCursor for RemoteCursor {
    fn next_entry(&mut self) -> Result<Option<(String, Vec<u8>)>> {
        if self.buffered.is_empty() && !self.exhausted {
            self.fetch_page()?;
        }
        Ok(self.buffered.pop_front())
    }

    fn close(&mut self) {
        self.buffered.clear();
        self.exhausted = true;
    }
}
