//! Verdicts, daemon status signals, and session outcomes

use std::fmt;

/// Decision produced by the context classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Fingerprint verification should be attempted
    Proceed,
    /// Fingerprint verification should be skipped
    Skip(SkipReason),
}

/// Why the classifier decided against attempting verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The invocation originates from a remote or non-interactive session
    RemoteSession,
    /// Login-time policy requires a password first
    LoginRequiresPassword,
    /// The fingerprint daemon is unreachable or has no devices
    ServiceUnavailable,
    /// The target identity has no enrolled fingerprints
    NoEnrollment,
    /// The identity already holds an active session on this host
    SessionAlreadyEstablished,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::RemoteSession => "remote or non-interactive session",
            SkipReason::LoginRequiresPassword => "login requires a password",
            SkipReason::ServiceUnavailable => "fingerprint service unavailable",
            SkipReason::NoEnrollment => "no enrolled fingerprints",
            SkipReason::SessionAlreadyEstablished => "session already established",
        };
        f.write_str(text)
    }
}

/// One status the daemon emits while a verification pass runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSignal {
    Match,
    NoMatch,
    SwipeTooShort,
    FingerNotCentered,
    RemoveAndRetry,
    /// A status tag this version does not recognize
    Other(String),
}

impl MatchSignal {
    /// Map a daemon status tag to a signal
    ///
    /// Unknown tags are preserved verbatim so logs can name them.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "verify-match" => MatchSignal::Match,
            "verify-no-match" => MatchSignal::NoMatch,
            "verify-swipe-too-short" => MatchSignal::SwipeTooShort,
            "verify-finger-not-centered" => MatchSignal::FingerNotCentered,
            "verify-remove-and-retry" => MatchSignal::RemoveAndRetry,
            other => MatchSignal::Other(other.to_string()),
        }
    }
}

/// A match signal together with the daemon's attempt-concluded flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub signal: MatchSignal,
    pub done: bool,
}

/// Terminal result of a verification session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A fingerprint matched within the attempt budget
    Success,
    /// Every attempt concluded without a match
    Failed,
    /// An attempt deadline expired
    TimedOut,
    /// No device could be claimed for the session
    DeviceUnavailable,
    /// The daemon conversation broke down after a claim
    Error(String),
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Success => f.write_str("success"),
            SessionOutcome::Failed => f.write_str("failed"),
            SessionOutcome::TimedOut => f.write_str("timed out"),
            SessionOutcome::DeviceUnavailable => f.write_str("device unavailable"),
            SessionOutcome::Error(detail) => write!(f, "error: {detail}"),
        }
    }
}
