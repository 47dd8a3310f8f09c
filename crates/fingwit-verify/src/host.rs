//! Host-level probes: logind sessions and encrypted home markers

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use zbus::zvariant::OwnedObjectPath;
use zbus::Connection;

use fingwit_core::{FingwitError, SessionProbes};

use crate::error::Result;

const LOGIND_SERVICE: &str = "org.freedesktop.login1";
const LOGIND_PATH: &str = "/org/freedesktop/login1";
const LOGIND_MANAGER_INTERFACE: &str = "org.freedesktop.login1.Manager";

/// Upper bound on the logind session query
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Session and home-directory facts read from the host
pub struct HostProbes {
    home_root: PathBuf,
}

impl Default for HostProbes {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbes {
    /// Probes against the standard home root
    pub fn new() -> Self {
        Self {
            home_root: PathBuf::from("/home"),
        }
    }

    /// Probes against an alternate home root
    pub fn with_home_root(home_root: impl Into<PathBuf>) -> Self {
        Self {
            home_root: home_root.into(),
        }
    }

    /// Owners of every session logind currently tracks
    async fn session_owners() -> Result<Vec<String>> {
        let connection = Connection::system().await?;
        let reply = connection
            .call_method(
                Some(LOGIND_SERVICE),
                LOGIND_PATH,
                Some(LOGIND_MANAGER_INTERFACE),
                "ListSessions",
                &(),
            )
            .await?;
        let sessions: Vec<(String, u32, String, String, OwnedObjectPath)> =
            reply.body().deserialize()?;
        Ok(sessions
            .into_iter()
            .map(|(_, _, owner, _, _)| owner)
            .collect())
    }

    /// Marker paths an encrypted-until-login home leaves on disk
    fn encrypted_home_markers(&self, username: &str) -> [PathBuf; 3] {
        [
            self.home_root.join(".ecryptfs").join(username),
            self.home_root.join(username).join(".ecryptfs"),
            self.home_root.join(username).join(".Private"),
        ]
    }
}

#[async_trait]
impl SessionProbes for HostProbes {
    async fn active_session_for(&self, username: &str) -> fingwit_core::Result<bool> {
        match timeout(PROBE_TIMEOUT, Self::session_owners()).await {
            Ok(Ok(owners)) => Ok(owners.iter().any(|owner| owner == username)),
            Ok(Err(err)) => Err(FingwitError::Probe(format!("logind sessions: {err}"))),
            Err(_) => Err(FingwitError::Probe(
                "logind sessions: probe timed out".to_string(),
            )),
        }
    }

    async fn encrypted_home(&self, username: &str) -> fingwit_core::Result<bool> {
        let markers = self.encrypted_home_markers(username);
        Ok(markers.iter().any(|marker| marker.exists()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_paths_are_per_user() {
        let probes = HostProbes::with_home_root("/home");
        let markers = probes.encrypted_home_markers("carol");

        assert_eq!(markers[0], PathBuf::from("/home/.ecryptfs/carol"));
        assert_eq!(markers[1], PathBuf::from("/home/carol/.ecryptfs"));
        assert_eq!(markers[2], PathBuf::from("/home/carol/.Private"));
    }

    #[tokio::test]
    async fn test_encrypted_home_detects_ecryptfs_registry() {
        let root = tempfile::tempdir().unwrap();
        let probes = HostProbes::with_home_root(root.path());

        assert!(!probes.encrypted_home("alice").await.unwrap());

        std::fs::create_dir_all(root.path().join(".ecryptfs/alice")).unwrap();
        assert!(probes.encrypted_home("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_encrypted_home_detects_private_dir() {
        let root = tempfile::tempdir().unwrap();
        let probes = HostProbes::with_home_root(root.path());

        std::fs::create_dir_all(root.path().join("bob/.Private")).unwrap();

        assert!(probes.encrypted_home("bob").await.unwrap());
        assert!(!probes.encrypted_home("alice").await.unwrap());
    }
}
