//! Command definitions
//!
//! Requests sent by the adapter to the key-value service.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    Delete = 0x03,
    Ping = 0x04,
    Scan = 0x05,
    Init = 0x06,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Upsert a key-value pair
    Set { key: String, value: Vec<u8> },

    /// Delete a key
    Delete { key: String },

    /// Ping (health check)
    Ping,

    /// Up to `limit` entries of `[start, end)` in key order (0 = server default)
    Scan { start: String, end: String, limit: u32 },

    /// Reset the backend, dropping every key
    Init,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
            Command::Scan { .. } => CommandType::Scan,
            Command::Init => CommandType::Init,
        }
    }
}
