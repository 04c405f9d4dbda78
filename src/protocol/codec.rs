//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:    key_len (4 bytes) + key
//! - SET:    key_len (4 bytes) + key + value
//! - DELETE: key_len (4 bytes) + key
//! - SCAN:   start_len (4) + start + end_len (4) + end + limit (4)
//! - PING, INIT: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### SCAN Response Payload
//! ```text
//! count (4) + [key_len (4) + key + value_len (4) + value] * count
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, StateError};
use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Payload Helpers
// =============================================================================

fn put_len_prefixed(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_u32(bytes.len() as u32);
    buf.put_slice(bytes);
}

fn take_u32(payload: &mut &[u8], what: &str) -> Result<u32> {
    if payload.remaining() < 4 {
        return Err(StateError::Protocol(format!("{}: missing length", what)));
    }
    Ok(payload.get_u32())
}

fn take_bytes<'a>(payload: &mut &'a [u8], what: &str) -> Result<&'a [u8]> {
    let len = take_u32(payload, what)? as usize;
    if payload.len() < len {
        return Err(StateError::Protocol(format!(
            "{}: incomplete field (expected {}, got {})",
            what,
            len,
            payload.len()
        )));
    }
    let data: &'a [u8] = *payload;
    let (field, rest) = data.split_at(len);
    *payload = rest;
    Ok(field)
}

fn take_string(payload: &mut &[u8], what: &str) -> Result<String> {
    let bytes = take_bytes(payload, what)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| StateError::Protocol(format!("{}: key is not valid UTF-8", what)))
}

fn expect_consumed(payload: &[u8], what: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(StateError::Protocol(format!(
            "{}: unexpected payload of {} bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}

/// Parse and validate a 5-byte header, returning (type byte, payload length)
fn parse_header(header: &[u8], what: &str) -> Result<(u8, usize)> {
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(StateError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    Ok((header[0], payload_len as usize))
}

fn frame(type_byte: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(type_byte);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::Get { key } | Command::Delete { key } => {
            put_len_prefixed(&mut payload, key.as_bytes());
        }
        Command::Set { key, value } => {
            put_len_prefixed(&mut payload, key.as_bytes());
            payload.put_slice(value);
        }
        Command::Scan { start, end, limit } => {
            put_len_prefixed(&mut payload, start.as_bytes());
            put_len_prefixed(&mut payload, end.as_bytes());
            payload.put_u32(*limit);
        }
        Command::Ping | Command::Init => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    if bytes.len() < HEADER_SIZE {
        return Err(StateError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let (cmd_type, payload_len) = parse_header(bytes, "Command")?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StateError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let mut payload = &bytes[HEADER_SIZE..total_len];

    // Parse command based on type
    match cmd_type {
        0x01 => {
            let key = take_string(&mut payload, "GET command")?;
            expect_consumed(payload, "GET command")?;
            Ok(Command::Get { key })
        }
        0x02 => {
            let key = take_string(&mut payload, "SET command")?;
            Ok(Command::Set {
                key,
                value: payload.to_vec(),
            })
        }
        0x03 => {
            let key = take_string(&mut payload, "DELETE command")?;
            expect_consumed(payload, "DELETE command")?;
            Ok(Command::Delete { key })
        }
        0x04 => {
            expect_consumed(payload, "PING command")?;
            Ok(Command::Ping)
        }
        0x05 => {
            let start = take_string(&mut payload, "SCAN command")?;
            let end = take_string(&mut payload, "SCAN command")?;
            let limit = take_u32(&mut payload, "SCAN command")?;
            expect_consumed(payload, "SCAN command")?;
            Ok(Command::Scan { start, end, limit })
        }
        0x06 => {
            expect_consumed(payload, "INIT command")?;
            Ok(Command::Init)
        }
        _ => Err(StateError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < HEADER_SIZE {
        return Err(StateError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let (status_byte, payload_len) = parse_header(bytes, "Response")?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StateError::Protocol(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(StateError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload_len > 0 {
        Some(bytes[HEADER_SIZE..total_len].to_vec())
    } else {
        None
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Scan Entries
// =============================================================================

/// Encode scan results as a SCAN response payload
pub fn encode_entries(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u32(entries.len() as u32);
    for (key, value) in entries {
        put_len_prefixed(&mut buf, key.as_bytes());
        put_len_prefixed(&mut buf, value);
    }
    buf.to_vec()
}

/// Decode a SCAN response payload
pub fn decode_entries(mut payload: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let count = take_u32(&mut payload, "SCAN response")? as usize;

    // Every entry needs at least its two length prefixes
    if count > payload.len() / 8 {
        return Err(StateError::Protocol(format!(
            "SCAN response: {} entries cannot fit in {} bytes",
            count,
            payload.len()
        )));
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let key = take_string(&mut payload, "SCAN response")?;
        let value = take_bytes(&mut payload, "SCAN response")?.to_vec();
        entries.push((key, value));
    }
    expect_consumed(payload, "SCAN response")?;

    Ok(entries)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let (_, payload_len) = parse_header(&header, what)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "Command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "Response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
