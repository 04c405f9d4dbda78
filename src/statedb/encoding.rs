//! Value codec
//!
//! ## Envelope
//! ```text
//! ┌─────────┬───────────────────────────────────────────────┐
//! │ Tag (1) │ bincode(VersionedValueMsg)                    │
//! │  0x00   │   version_bytes | value? | metadata?          │
//! └─────────┴───────────────────────────────────────────────┘
//! ```
//! The tag keeps later envelope formats distinguishable from this one.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::version::Height;

use super::VersionedValue;

/// Tag of the current format (metadata-aware)
pub const FORMAT_TAG: u8 = 0x00;

/// Upper bound accepted when decoding a message (16 MB)
const MAX_MESSAGE_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct VersionedValueMsg {
    version_bytes: Vec<u8>,
    /// Empty values are written as absent
    value: Option<Vec<u8>>,
    metadata: Option<Vec<u8>>,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_MESSAGE_SIZE)
}

/// Encode a versioned value into the tagged envelope
pub fn encode_value(v: &VersionedValue) -> Result<Vec<u8>> {
    let msg = VersionedValueMsg {
        version_bytes: v.version.to_bytes(),
        value: if v.value.is_empty() {
            None
        } else {
            Some(v.value.clone())
        },
        metadata: v.metadata.clone(),
    };

    let body = codec()
        .serialize(&msg)
        .map_err(|e| StateError::Encoding(e.to_string()))?;

    let mut encoded = Vec::with_capacity(1 + body.len());
    encoded.push(FORMAT_TAG);
    encoded.extend_from_slice(&body);
    Ok(encoded)
}

/// Decode a tagged envelope back into a versioned value
pub fn decode_value(encoded: &[u8]) -> Result<VersionedValue> {
    let (&tag, body) = encoded
        .split_first()
        .ok_or_else(|| StateError::Decoding("empty value envelope".to_string()))?;

    if tag != FORMAT_TAG {
        return Err(StateError::Decoding(format!(
            "unknown value format tag: 0x{:02x}",
            tag
        )));
    }

    let msg: VersionedValueMsg = codec()
        .deserialize(body)
        .map_err(|e| StateError::Decoding(e.to_string()))?;

    Ok(VersionedValue {
        value: msg.value.unwrap_or_default(),
        metadata: msg.metadata,
        version: Height::from_bytes(&msg.version_bytes)?,
    })
}
