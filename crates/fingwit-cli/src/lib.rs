//! Fingwit CLI - Fingerprint login helper
//!
//! The `fingwit` binary glues the context classifier and the verification
//! session to a host authentication stack: it snapshots the invoking
//! context, classifies it, optionally runs one verification session, and
//! exits with a PAM-style result code.

pub mod config;
pub mod context;
pub mod host;

pub use config::FingwitConfig;
pub use context::snapshot_context;
pub use host::{exit_code_for_outcome, DeferCode, StderrConversation};
