//! Immutable snapshot of the invoking session

use crate::error::{FingwitError, Result};

/// Facts about the invocation, captured once at process entry
///
/// Classification never mutates the snapshot; deciding the same snapshot
/// twice yields the same verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    service: Option<String>,
    parent_process: Option<String>,
    remote_indicators: bool,
    interactive_stdin: bool,
    username: String,
}

impl SessionContext {
    /// Build a context snapshot
    ///
    /// The username is mandatory; an authentication decision without a
    /// target identity is refused outright.
    pub fn new(
        username: impl Into<String>,
        service: Option<String>,
        parent_process: Option<String>,
        remote_indicators: bool,
        interactive_stdin: bool,
    ) -> Result<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(FingwitError::MissingUsername);
        }
        Ok(Self {
            service,
            parent_process,
            remote_indicators,
            interactive_stdin,
            username,
        })
    }

    /// Requesting service name, as reported by the authentication stack
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Name of the immediate parent process, when readable
    pub fn parent_process(&self) -> Option<&str> {
        self.parent_process.as_deref()
    }

    /// Whether remote-session environment markers were present
    pub fn remote_indicators(&self) -> bool {
        self.remote_indicators
    }

    /// Whether standard input is attached to a terminal
    pub fn interactive_stdin(&self) -> bool {
        self.interactive_stdin
    }

    /// Identity being authenticated
    pub fn username(&self) -> &str {
        &self.username
    }
}
