//! Client Module
//!
//! The remote variant of `KvBackend`: get/set/delete/range against one
//! key-value service address over the binary protocol.
//!
//! ## Architecture
//! - `ClientConnection`: one TCP connection, one exchange at a time
//! - `ConnectionSource`: per-call connections, optionally pooled
//! - `RemoteClient`: the primitives, mapping status codes to results
//! - `RemoteCursor`: range cursor fetching fixed-size pages

mod connection;
mod cursor;
mod pool;
mod remote;

pub use connection::ClientConnection;
pub use cursor::RemoteCursor;
pub use pool::ConnectionSource;
pub use remote::RemoteClient;
