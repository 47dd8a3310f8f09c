//! Fingwit Core - Decision model for fingerprint login
//!
//! This crate carries the shared vocabulary of the fingwit authentication
//! helper: the immutable snapshot of an invocation, the classifier that
//! turns it into a proceed-or-skip verdict, and the signal and outcome
//! types the verification layer reports back through.

pub mod classify;
pub mod context;
pub mod conv;
pub mod error;
pub mod policy;
pub mod types;

pub use classify::{CapabilityProbes, Classifier, SessionProbes};
pub use context::SessionContext;
pub use conv::Conversation;
pub use error::{FingwitError, Result};
pub use policy::{ClassifierConfig, SessionPolicy};
pub use types::{MatchSignal, SessionOutcome, SkipReason, StatusEvent, Verdict};

/// Default number of verification attempts per session
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-attempt deadline in seconds
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;

/// Services that present an initial login prompt
pub const DEFAULT_LOGIN_SERVICES: &[&str] = &["lightdm", "gdm", "sddm", "login"];

/// Display manager process names that parent login prompts
///
/// Kernel process names are truncated to 15 bytes, hence the clipped
/// `gdm-session-wor`.
pub const DEFAULT_DISPLAY_MANAGERS: &[&str] =
    &["lightdm", "gdm", "gdm-session-wor", "sddm", "login"];

/// Remote shell daemons whose direct children are remote sessions
pub const DEFAULT_REMOTE_SHELL_DAEMONS: &[&str] = &["sshd"];
