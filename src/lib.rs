//! # statekv
//!
//! A versioned state-database adapter for a ledger's transaction-management
//! layer, storing namespaced, height-versioned state in a key-value service:
//! - Many logical stores multiplexed over one flat key space
//! - Tagged binary envelope for versioned values
//! - Savepoint marker for crash recovery
//! - Paginated range scans with resumable bookmarks
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Transaction Management                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  VersionedDb
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │        StateDbProvider  →  VersionedStore (per name)         │
//! │          composite keys · value codec · savepoint            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  KvBackend
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │RemoteClient │          │MemoryBackend│
//!   │  (TCP RPC)  │          │ (embedded)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │  KV service │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod version;

pub mod protocol;
pub mod backend;
pub mod client;
pub mod network;
pub mod statedb;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StateError};
pub use config::{BackendKind, Config};
pub use version::Height;
pub use statedb::{
    QueryResultsIterator, RangeOptions, ResultsIterator, StateDbProvider, UpdateBatch,
    VersionedDb, VersionedDbProvider, VersionedKv, VersionedStore, VersionedValue,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of statekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
