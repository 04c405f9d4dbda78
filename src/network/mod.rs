//! Network Module
//!
//! Development key-value service speaking the client protocol.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands executed against a `MemoryBackend`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
