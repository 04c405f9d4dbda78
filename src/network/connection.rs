//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::time::Duration;

use crate::backend::{KvBackend, MemoryBackend};
use crate::error::{Result, StateError};
use crate::protocol::{encode_entries, read_command, write_response, Command, Response};

/// Upper bound on entries returned by one SCAN
pub const MAX_SCAN_ENTRIES: usize = 4096;

/// Byte budget for a SCAN payload, kept below the frame limit
const SCAN_PAYLOAD_BUDGET: usize = 8 * 1024 * 1024;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Store serving the requests
    backend: MemoryBackend,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, backend: MemoryBackend) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            backend,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects, goes idle past the read timeout,
    /// or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(StateError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(StateError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = write_response(&mut self.writer, &Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = write_response(&mut self.writer, &response) {
                if let StateError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command and return a response
    fn execute_command(&self, command: Command) -> Response {
        let result = match command {
            Command::Get { key } => self.backend.get(&key).map(|value| match value {
                Some(value) => Response::ok(Some(value)),
                None => Response::not_found(),
            }),
            Command::Set { key, value } => {
                self.backend.set(&key, &value).map(|_| Response::ok(None))
            }
            Command::Delete { key } => self.backend.delete(&key).map(|_| Response::ok(None)),
            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),
            Command::Scan { start, end, limit } => Ok(self.scan(&start, &end, limit)),
            Command::Init => {
                tracing::info!("Dropping all keys at request of {}", self.peer_addr);
                self.backend.drop_all().map(|_| Response::ok(None))
            }
        };

        result.unwrap_or_else(|e| Response::error(&e.to_string()))
    }

    /// One page of a range, trimmed to the payload budget
    fn scan(&self, start: &str, end: &str, limit: u32) -> Response {
        let limit = match limit as usize {
            0 => MAX_SCAN_ENTRIES,
            n => n.min(MAX_SCAN_ENTRIES),
        };

        let mut entries = self.backend.scan(start, end, limit);

        let mut size = 0;
        let keep = entries
            .iter()
            .position(|(k, v)| {
                size += 8 + k.len() + v.len();
                size > SCAN_PAYLOAD_BUDGET
            })
            .unwrap_or(entries.len())
            .max(1);
        entries.truncate(keep);

        Response::ok(Some(encode_entries(&entries)))
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
