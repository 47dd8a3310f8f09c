//! Error types for the fingwit core library

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, FingwitError>;

#[derive(Error, Debug)]
pub enum FingwitError {
    /// No target identity was supplied for the invocation
    #[error("No username provided for authentication")]
    MissingUsername,

    /// Session policy rejected at construction
    #[error("Invalid session policy: {0}")]
    InvalidPolicy(String),

    /// An OS or daemon probe could not establish its fact
    #[error("Probe failed: {0}")]
    Probe(String),
}
