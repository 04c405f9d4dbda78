//! Client Connection
//!
//! One TCP connection to the key-value service, used for request/response
//! exchanges.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, StateError};
use crate::protocol::{read_response, write_command, Command, Response};

/// A connection to the key-value service
pub struct ClientConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl ClientConnection {
    /// Connect to `addr`, trying each resolved address in turn
    ///
    /// `request_timeout` bounds every read and write on the connection.
    pub fn open(addr: &str, connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let candidates = addr
            .to_socket_addrs()
            .map_err(|e| StateError::Unavailable(format!("cannot resolve {}: {}", addr, e)))?;

        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, connect_timeout) {
                Ok(stream) => return Self::from_stream(stream, request_timeout),
                Err(e) => last_err = Some(e),
            }
        }

        Err(StateError::Unavailable(match last_err {
            Some(e) => format!("cannot connect to {}: {}", addr, e),
            None => format!("{} resolved to no addresses", addr),
        }))
    }

    fn from_stream(stream: TcpStream, request_timeout: Duration) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true).map_err(unavailable)?;

        if !request_timeout.is_zero() {
            stream
                .set_read_timeout(Some(request_timeout))
                .map_err(unavailable)?;
            stream
                .set_write_timeout(Some(request_timeout))
                .map_err(unavailable)?;
        }

        let read_stream = stream.try_clone().map_err(unavailable)?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
        })
    }

    /// Send one command and wait for its response
    ///
    /// I/O failures, including timeouts, surface as `Unavailable`.
    pub fn exchange(&mut self, command: &Command) -> Result<Response> {
        tracing::trace!("Sending to {}: {:?}", self.peer_addr, command.command_type());

        write_command(&mut self.writer, command).map_err(io_to_unavailable)?;
        read_response(&mut self.reader).map_err(io_to_unavailable)
    }

    /// Whether an idle connection can carry another request
    ///
    /// A peer that closed the socket, or sent bytes nobody asked for, leaves
    /// something readable; a healthy idle socket has nothing to read.
    pub fn is_reusable(&self) -> bool {
        if !self.reader.buffer().is_empty() {
            return false;
        }

        let stream = self.reader.get_ref();
        if stream.set_nonblocking(true).is_err() {
            return false;
        }
        let mut probe = [0u8; 1];
        let idle = matches!(stream.peek(&mut probe), Err(ref e) if e.kind() == ErrorKind::WouldBlock);

        stream.set_nonblocking(false).is_ok() && idle
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn unavailable(err: std::io::Error) -> StateError {
    StateError::Unavailable(err.to_string())
}

fn io_to_unavailable(err: StateError) -> StateError {
    match err {
        StateError::Io(e) => unavailable(e),
        other => other,
    }
}
