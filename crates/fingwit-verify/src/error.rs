//! Error types for verification sessions

use thiserror::Error;

/// Result type alias for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Error, Debug)]
pub enum VerifyError {
    /// D-Bus transport or call failure
    #[error("Bus error: {0}")]
    Bus(#[from] zbus::Error),

    /// The daemon reports no fingerprint devices
    #[error("No fingerprint devices present")]
    NoDevices,

    /// The device could not be claimed for the target identity
    #[error("Claim failed: {0}")]
    Claim(String),

    /// The daemon conversation broke down after the device was claimed
    #[error("Verification protocol error: {0}")]
    Protocol(String),

    /// The status feed ended before the attempt concluded
    #[error("Verification status feed closed")]
    FeedClosed,
}
