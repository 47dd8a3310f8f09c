//! Context snapshot for the current invocation

use std::io::IsTerminal;

use fingwit_core::{Result, SessionContext};

/// Environment variables that mark a forwarded remote session
const REMOTE_ENV_MARKERS: &[&str] = &[
    "SSH_CLIENT",
    "SSH_CONNECTION",
    "SSH_TTY",
    "SSH_ORIGINAL_COMMAND",
];

/// Environment variable carrying the requesting service name
const SERVICE_ENV: &str = "PAM_SERVICE";

/// Capture the facts the classifier needs, once, at process entry
///
/// Unreadable facts degrade to absent or false rather than failing the
/// invocation; only a missing username is an error.
pub fn snapshot_context(username: &str, service: Option<String>) -> Result<SessionContext> {
    let service = service.or_else(|| std::env::var(SERVICE_ENV).ok().filter(|s| !s.is_empty()));

    SessionContext::new(
        username,
        service,
        parent_process_name(),
        remote_indicators_present(),
        std::io::stdin().is_terminal(),
    )
}

/// Whether any remote-session environment markers are set
fn remote_indicators_present() -> bool {
    REMOTE_ENV_MARKERS
        .iter()
        .any(|marker| std::env::var_os(marker).is_some())
}

/// Name of the immediate parent process
fn parent_process_name() -> Option<String> {
    read_comm(std::os::unix::process::parent_id())
}

/// Read a process name from /proc/<pid>/comm
fn read_comm(pid: u32) -> Option<String> {
    let comm = std::fs::read_to_string(format!("/proc/{pid}/comm")).ok()?;
    let name = comm.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
