//! Protocol Module
//!
//! Defines the wire protocol between the adapter and the key-value service.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET    - Payload: key_len (4) + key
//! - 0x02: SET    - Payload: key_len (4) + key + value
//! - 0x03: DEL    - Payload: key_len (4) + key
//! - 0x04: PING   - Payload: empty
//! - 0x05: SCAN   - Payload: start_len (4) + start + end_len (4) + end + limit (4)
//! - 0x06: INIT   - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_entries, decode_response, encode_command, encode_entries,
    encode_response, read_command, read_response, write_command, write_response, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
