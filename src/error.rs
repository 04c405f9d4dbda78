//! Error types for statekv
//!
//! Provides a unified error type for all operations.
//!
//! "Key not found" and "range exhausted" are never errors: they surface as
//! `Ok(None)` / end-of-iteration. Errors are reserved for failures of the
//! operation itself and are always propagated verbatim.

use thiserror::Error;

/// Result type alias using StateError
pub type Result<T> = std::result::Result<T, StateError>;

/// Unified error type for statekv operations
#[derive(Debug, Error)]
pub enum StateError {
    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// The backend could not be reached (connect failure, timeout, reset)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but reported an application-level failure
    #[error("Backend error: {0}")]
    Backend(String),

    // -------------------------------------------------------------------------
    // Value Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Capability Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // I/O and Wire Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

