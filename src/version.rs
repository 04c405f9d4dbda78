//! Write heights
//!
//! A `Height` identifies the transaction that produced a write:
//! `(block_num, tx_num)`, ordered by block first.

use std::fmt;

use crate::error::{Result, StateError};

/// Serialized size: block_num (8) + tx_num (8)
pub const HEIGHT_SIZE: usize = 16;

/// Position of a write in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Height {
    pub block_num: u64,
    pub tx_num: u64,
}

impl Height {
    pub fn new(block_num: u64, tx_num: u64) -> Self {
        Self { block_num, tx_num }
    }

    /// Big-endian encoding; byte order matches `Ord`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEIGHT_SIZE);
        bytes.extend_from_slice(&self.block_num.to_be_bytes());
        bytes.extend_from_slice(&self.tx_num.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEIGHT_SIZE {
            return Err(StateError::Decoding(format!(
                "Height: expected {} bytes, got {}",
                HEIGHT_SIZE,
                bytes.len()
            )));
        }

        let mut block = [0u8; 8];
        let mut tx = [0u8; 8];
        block.copy_from_slice(&bytes[0..8]);
        tx.copy_from_slice(&bytes[8..16]);

        Ok(Self {
            block_num: u64::from_be_bytes(block),
            tx_num: u64::from_be_bytes(tx),
        })
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_num, self.tx_num)
    }
}
