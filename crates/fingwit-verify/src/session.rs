//! Verification session orchestration
//!
//! Drives a bounded number of verification attempts against a scanner
//! backend. Every attempt claims the device fresh, races the status feed
//! against the attempt deadline, and tears the claim down in a fixed order
//! no matter how the attempt went.

use std::time::Duration;

use tracing::{debug, info, warn};

use fingwit_core::{Conversation, MatchSignal, SessionOutcome, SessionPolicy, StatusEvent};

use crate::error::VerifyError;
use crate::scanner::{ClaimedScanner, ScannerBackend};

/// Prompt shown before the first attempt
pub const PLACE_FINGER_PROMPT: &str = "Place your finger on the fingerprint reader";

/// Message shown when a fingerprint matched
pub const SUCCESS_MESSAGE: &str = "Fingerprint verification successful";

/// Message shown when the session concluded without a match
pub const FAILURE_MESSAGE: &str = "Fingerprint verification failed";

/// How one attempt concluded
enum AttemptOutcome {
    /// A fingerprint matched
    Matched,
    /// The attempt concluded without a match; carries the last failure
    /// signal for retry feedback
    NoMatch(Option<MatchSignal>),
    /// The attempt deadline fired first
    TimedOut,
    /// The device could not be claimed
    ClaimFailed(VerifyError),
    /// The daemon conversation failed after the claim
    Protocol(VerifyError),
}

/// Run one verification session to a definite outcome
///
/// Never returns an error: every failure mode folds into a
/// [`SessionOutcome`] for the host to map. Only attempts that conclude
/// without a match consume the attempt budget; a timeout, claim failure,
/// or protocol error ends the session at once.
pub async fn run_session<B>(
    backend: &B,
    conv: &dyn Conversation,
    username: &str,
    policy: &SessionPolicy,
) -> SessionOutcome
where
    B: ScannerBackend,
{
    conv.info(PLACE_FINGER_PROMPT);

    let mut attempt = 1u32;
    loop {
        debug!(attempt, max_attempts = policy.max_attempts, "starting verification attempt");

        match run_attempt(backend, username, policy.attempt_timeout).await {
            AttemptOutcome::Matched => {
                info!(username, attempt, "fingerprint matched");
                conv.info(SUCCESS_MESSAGE);
                return SessionOutcome::Success;
            }
            AttemptOutcome::NoMatch(last_signal) => {
                if attempt >= policy.max_attempts {
                    info!(username, attempts = attempt, "no match within attempt budget");
                    conv.error(FAILURE_MESSAGE);
                    return SessionOutcome::Failed;
                }
                conv.error(retry_feedback(last_signal.as_ref()));
                attempt += 1;
            }
            AttemptOutcome::TimedOut => {
                warn!(username, attempt, timeout = ?policy.attempt_timeout, "verification attempt timed out");
                conv.error(FAILURE_MESSAGE);
                return SessionOutcome::TimedOut;
            }
            AttemptOutcome::ClaimFailed(err) => {
                debug!(username, error = %err, "no claimable fingerprint device");
                return SessionOutcome::DeviceUnavailable;
            }
            AttemptOutcome::Protocol(err) => {
                warn!(username, error = %err, "verification aborted");
                return SessionOutcome::Error(err.to_string());
            }
        }
    }
}

/// Run a single attempt: claim, verify, tear down
///
/// The claim itself is not raced against the deadline; an abandoned claim
/// call could leave the device held with nobody left to release it.
async fn run_attempt<B>(backend: &B, username: &str, attempt_timeout: Duration) -> AttemptOutcome
where
    B: ScannerBackend,
{
    let mut scanner = match backend.claim(username).await {
        Ok(scanner) => scanner,
        Err(err) => return AttemptOutcome::ClaimFailed(err),
    };

    let outcome = drive_verification(&mut scanner, attempt_timeout).await;

    // Teardown runs regardless of the outcome and in a fixed order: stop
    // the pass, then release the claim. Failures here are logged and
    // swallowed; the outcome is already settled.
    if let Err(err) = scanner.stop_verify().await {
        debug!(error = %err, "could not stop verification cleanly");
    }
    if let Err(err) = scanner.release().await {
        warn!(error = %err, "could not release fingerprint device");
    }

    outcome
}

/// Start verification and wait for a concluding signal or the deadline
async fn drive_verification<S>(scanner: &mut S, attempt_timeout: Duration) -> AttemptOutcome
where
    S: ClaimedScanner,
{
    let deadline = tokio::time::sleep(attempt_timeout);
    tokio::pin!(deadline);

    tokio::select! {
        started = scanner.start_verify() => {
            if let Err(err) = started {
                return AttemptOutcome::Protocol(err);
            }
        }
        _ = &mut deadline => return AttemptOutcome::TimedOut,
    }

    let mut last_failure = None;
    loop {
        tokio::select! {
            event = scanner.next_status() => {
                match event {
                    Ok(event) => {
                        if let Some(outcome) = absorb_status(event, &mut last_failure) {
                            return outcome;
                        }
                    }
                    Err(err) => return AttemptOutcome::Protocol(err),
                }
            }
            _ = &mut deadline => return AttemptOutcome::TimedOut,
        }
    }
}

/// Fold one status event into the attempt
///
/// Returns the attempt outcome once an event concludes it. Recognized
/// failure signals are recorded for retry feedback; unrecognized tags are
/// logged and never recorded, though their `done` flag still concludes
/// the attempt.
fn absorb_status(
    event: StatusEvent,
    last_failure: &mut Option<MatchSignal>,
) -> Option<AttemptOutcome> {
    let done = event.done;
    match event.signal {
        MatchSignal::Match => return Some(AttemptOutcome::Matched),
        MatchSignal::Other(tag) => {
            debug!(tag = %tag, done, "unrecognized verify status");
        }
        signal => {
            debug!(?signal, done, "verify status");
            *last_failure = Some(signal);
        }
    }
    if done {
        Some(AttemptOutcome::NoMatch(last_failure.clone()))
    } else {
        None
    }
}

/// Corrective feedback between attempts, derived from the last signal
fn retry_feedback(last_signal: Option<&MatchSignal>) -> &'static str {
    match last_signal {
        Some(MatchSignal::SwipeTooShort) => "Swipe too short. Try again...",
        Some(MatchSignal::FingerNotCentered) => "Finger not centered. Try again...",
        Some(MatchSignal::RemoveAndRetry) => "Remove your finger and try again...",
        _ => "Try again...",
    }
}
