//! Session bounds and classifier configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FingwitError, Result};
use crate::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_DISPLAY_MANAGERS, DEFAULT_LOGIN_SERVICES,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REMOTE_SHELL_DAEMONS,
};

/// Bounds for one verification session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Maximum verification attempts before the session fails
    pub max_attempts: u32,

    /// Deadline for a single attempt
    pub attempt_timeout: Duration,

    /// Emit verbose diagnostics for this invocation
    pub debug: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            debug: false,
        }
    }
}

impl SessionPolicy {
    /// Build a policy, rejecting bounds under which a session could never
    /// conclude
    pub fn new(max_attempts: u32, attempt_timeout: Duration, debug: bool) -> Result<Self> {
        if max_attempts == 0 {
            return Err(FingwitError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if attempt_timeout.is_zero() {
            return Err(FingwitError::InvalidPolicy(
                "attempt timeout must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            attempt_timeout,
            debug,
        })
    }
}

/// Service and process names the classifier consults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Services that present an initial login prompt
    pub login_services: Vec<String>,

    /// Display manager processes that parent login prompts
    pub display_managers: Vec<String>,

    /// Remote shell daemons whose direct children are remote sessions
    pub remote_shell_daemons: Vec<String>,

    /// Whether fingerprint login is allowed at the initial login prompt
    pub login_fingerprint_enabled: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            login_services: to_owned(DEFAULT_LOGIN_SERVICES),
            display_managers: to_owned(DEFAULT_DISPLAY_MANAGERS),
            remote_shell_daemons: to_owned(DEFAULT_REMOTE_SHELL_DAEMONS),
            login_fingerprint_enabled: true,
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
