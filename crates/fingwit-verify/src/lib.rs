//! Fingwit Verify - Fingerprint verification over fprintd
//!
//! This crate drives the device side of fingerprint login:
//! - Scanner abstraction the session orchestrator runs against
//! - fprintd D-Bus backend, plus availability and enrollment probes
//! - Host probes for active logind sessions and encrypted home markers
//! - The bounded, retried verification session itself

pub mod error;
pub mod fprintd;
pub mod host;
pub mod scanner;
pub mod session;

pub use error::{Result, VerifyError};
pub use fprintd::{list_devices, DeviceSummary, FprintdBackend, FprintdProbes, FprintdScanner};
pub use host::HostProbes;
pub use scanner::{ClaimedScanner, ScannerBackend};
pub use session::{run_session, FAILURE_MESSAGE, PLACE_FINGER_PROMPT, SUCCESS_MESSAGE};
