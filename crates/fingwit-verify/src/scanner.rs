//! Scanner device abstraction
//!
//! The session orchestrator drives verification through these traits. The
//! production implementation speaks to fprintd over D-Bus; tests script one
//! in memory.

use async_trait::async_trait;

use fingwit_core::StatusEvent;

use crate::error::Result;

/// Source of claimable fingerprint scanners
#[async_trait]
pub trait ScannerBackend: Send + Sync {
    /// Claimed-device handle this backend produces
    type Scanner: ClaimedScanner;

    /// Claim a scanner for the given identity
    ///
    /// A successful claim is already subscribed to the device's status
    /// feed, so no signal emitted after verification starts can be missed.
    /// Every successful claim must be paired with exactly one `release`.
    async fn claim(&self, username: &str) -> Result<Self::Scanner>;
}

/// An exclusively claimed scanner
#[async_trait]
pub trait ClaimedScanner: Send {
    /// Begin a verification pass
    async fn start_verify(&mut self) -> Result<()>;

    /// Wait for the next status emitted by the device
    async fn next_status(&mut self) -> Result<StatusEvent>;

    /// Stop an in-flight verification pass
    async fn stop_verify(&mut self) -> Result<()>;

    /// Release the claim
    async fn release(&mut self) -> Result<()>;
}
