//! Host result codes and the stderr conversation

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use fingwit_core::{Conversation, SessionOutcome};

/// PAM result codes the helper exits with
pub mod pam_code {
    /// Authentication succeeded
    pub const SUCCESS: i32 = 0;
    /// Authentication failed
    pub const AUTH_ERR: i32 = 7;
    /// Authentication information is unavailable
    pub const AUTHINFO_UNAVAIL: i32 = 9;
    /// The target user is not known
    pub const USER_UNKNOWN: i32 = 10;
    /// Defer the decision to the next module
    pub const IGNORE: i32 = 25;
}

/// Result code used when fingerprint authentication does not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeferCode {
    /// Report authentication information as unavailable
    Unavail,
    /// Step aside and let the next method decide
    Ignore,
}

impl DeferCode {
    /// Process exit code for this defer choice
    pub fn exit_code(self) -> i32 {
        match self {
            DeferCode::Unavail => pam_code::AUTHINFO_UNAVAIL,
            DeferCode::Ignore => pam_code::IGNORE,
        }
    }
}

/// Exit code for a concluded verification session
pub fn exit_code_for_outcome(outcome: &SessionOutcome, defer: DeferCode) -> i32 {
    match outcome {
        SessionOutcome::Success => pam_code::SUCCESS,
        SessionOutcome::Failed | SessionOutcome::TimedOut | SessionOutcome::Error(_) => {
            pam_code::AUTH_ERR
        }
        SessionOutcome::DeviceUnavailable => defer.exit_code(),
    }
}

/// Conversation that prints to stderr with the helper's prefix
///
/// Stdout stays clean; hosts capturing output only ever see prompts on
/// stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrConversation;

impl Conversation for StderrConversation {
    fn info(&self, message: &str) {
        eprintln!("fingwit: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("fingwit: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_exit_codes_with_unavail_defer() {
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::Success, DeferCode::Unavail),
            pam_code::SUCCESS
        );
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::Failed, DeferCode::Unavail),
            pam_code::AUTH_ERR
        );
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::TimedOut, DeferCode::Unavail),
            pam_code::AUTH_ERR
        );
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::Error("bus gone".to_string()), DeferCode::Unavail),
            pam_code::AUTH_ERR
        );
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::DeviceUnavailable, DeferCode::Unavail),
            pam_code::AUTHINFO_UNAVAIL
        );
    }

    #[test]
    fn test_device_unavailable_follows_defer_choice() {
        assert_eq!(
            exit_code_for_outcome(&SessionOutcome::DeviceUnavailable, DeferCode::Ignore),
            pam_code::IGNORE
        );
    }

    #[test]
    fn test_defer_exit_codes() {
        assert_eq!(DeferCode::Unavail.exit_code(), 9);
        assert_eq!(DeferCode::Ignore.exit_code(), 25);
    }
}
