//! Context classification ahead of any device interaction
//!
//! The classifier decides, per invocation, whether fingerprint verification
//! should be attempted at all. Facts that require talking to the OS or the
//! fingerprint daemon are reached through probe traits, and only once no
//! earlier rule has already settled the verdict.

use async_trait::async_trait;
use tracing::debug;

use crate::context::SessionContext;
use crate::error::Result;
use crate::policy::ClassifierConfig;
use crate::types::{SkipReason, Verdict};

/// Facts about existing sessions and the target's home directory
#[async_trait]
pub trait SessionProbes: Send + Sync {
    /// Whether the identity already owns an active session on this host
    async fn active_session_for(&self, username: &str) -> Result<bool>;

    /// Whether the identity's home directory stays encrypted until first
    /// login
    async fn encrypted_home(&self, username: &str) -> Result<bool>;
}

/// Facts about the fingerprint service and enrollment state
#[async_trait]
pub trait CapabilityProbes: Send + Sync {
    /// Whether the fingerprint daemon is reachable and has a device
    async fn service_ready(&self) -> Result<bool>;

    /// Whether the identity has at least one enrolled fingerprint
    async fn enrollment_present(&self, username: &str) -> Result<bool>;
}

/// Decides whether an invocation should attempt fingerprint verification
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify one invocation
    ///
    /// Rules run in a fixed order and the first match wins. The remote
    /// check comes before everything else, so a remote invocation never
    /// causes local device traffic. A probe failure reads as "fact not
    /// established": ambiguity skips rather than proceeds.
    pub async fn decide(
        &self,
        ctx: &SessionContext,
        sessions: &dyn SessionProbes,
        capability: &dyn CapabilityProbes,
    ) -> Verdict {
        debug!(
            username = ctx.username(),
            service = ?ctx.service(),
            parent = ?ctx.parent_process(),
            "classifying invocation"
        );

        if self.is_remote(ctx) {
            return Verdict::Skip(SkipReason::RemoteSession);
        }

        if probe_fact("active_session", sessions.active_session_for(ctx.username())).await {
            return Verdict::Skip(SkipReason::SessionAlreadyEstablished);
        }

        if self.is_login_context(ctx) {
            if !self.config.login_fingerprint_enabled {
                return Verdict::Skip(SkipReason::LoginRequiresPassword);
            }
            if probe_fact("encrypted_home", sessions.encrypted_home(ctx.username())).await {
                return Verdict::Skip(SkipReason::LoginRequiresPassword);
            }
        }

        if !probe_fact("service_ready", capability.service_ready()).await {
            return Verdict::Skip(SkipReason::ServiceUnavailable);
        }

        if !probe_fact("enrollment", capability.enrollment_present(ctx.username())).await {
            return Verdict::Skip(SkipReason::NoEnrollment);
        }

        Verdict::Proceed
    }

    /// Whether the invocation reaches us from outside the local console
    fn is_remote(&self, ctx: &SessionContext) -> bool {
        if ctx.remote_indicators() || !ctx.interactive_stdin() {
            return true;
        }
        match ctx.parent_process() {
            Some(parent) => self
                .config
                .remote_shell_daemons
                .iter()
                .any(|daemon| daemon == parent),
            None => false,
        }
    }

    /// Whether this is an initial login prompt rather than an in-session
    /// authorization
    ///
    /// Only the immediate parent is consulted. A display manager separated
    /// from the prompt by intermediate helper processes is not detected.
    fn is_login_context(&self, ctx: &SessionContext) -> bool {
        if let Some(service) = ctx.service() {
            if self.config.login_services.iter().any(|name| name == service) {
                return true;
            }
        }
        if let Some(parent) = ctx.parent_process() {
            if self.config.display_managers.iter().any(|name| name == parent) {
                return true;
            }
        }
        false
    }
}

/// Resolve a probed fact, reading failures as "false"
async fn probe_fact<F>(fact: &str, probe: F) -> bool
where
    F: std::future::Future<Output = Result<bool>>,
{
    match probe.await {
        Ok(value) => value,
        Err(err) => {
            debug!(fact, error = %err, "probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FingwitError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    #[derive(Default)]
    struct FakeProbes {
        active_session: bool,
        encrypted_home: bool,
        service_ready: bool,
        enrolled: bool,
        sessions_fail: bool,
        capability_fail: bool,
        session_calls: AtomicUsize,
        capability_calls: AtomicUsize,
    }

    impl FakeProbes {
        fn ready() -> Self {
            Self {
                service_ready: true,
                enrolled: true,
                ..Default::default()
            }
        }

        fn fact(&self, calls: &AtomicUsize, fail: bool, value: bool) -> Result<bool> {
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(FingwitError::Probe("probe offline".to_string()))
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl SessionProbes for FakeProbes {
        async fn active_session_for(&self, _username: &str) -> Result<bool> {
            self.fact(&self.session_calls, self.sessions_fail, self.active_session)
        }

        async fn encrypted_home(&self, _username: &str) -> Result<bool> {
            self.fact(&self.session_calls, self.sessions_fail, self.encrypted_home)
        }
    }

    #[async_trait]
    impl CapabilityProbes for FakeProbes {
        async fn service_ready(&self) -> Result<bool> {
            self.fact(&self.capability_calls, self.capability_fail, self.service_ready)
        }

        async fn enrollment_present(&self, _username: &str) -> Result<bool> {
            self.fact(&self.capability_calls, self.capability_fail, self.enrolled)
        }
    }

    fn ctx(
        service: Option<&str>,
        parent: Option<&str>,
        remote: bool,
        interactive: bool,
    ) -> SessionContext {
        SessionContext::new(
            "alice",
            service.map(String::from),
            parent.map(String::from),
            remote,
            interactive,
        )
        .unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::new(ClassifierConfig::default())
    }

    #[tokio::test]
    async fn test_remote_indicators_skip_without_touching_probes() {
        let probes = FakeProbes::ready();

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), true, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::RemoteSession));
        assert_eq!(probes.session_calls.load(Ordering::SeqCst), 0);
        assert_eq!(probes.capability_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_interactive_stdin_reads_as_remote() {
        let probes = FakeProbes::ready();

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, false), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::RemoteSession));
    }

    #[tokio::test]
    async fn test_remote_shell_parent_reads_as_remote() {
        let probes = FakeProbes::ready();

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("sshd"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::RemoteSession));
    }

    #[tokio::test]
    async fn test_established_session_wins_over_login_rules() {
        let mut probes = FakeProbes::ready();
        probes.active_session = true;
        probes.encrypted_home = true;

        let verdict = classifier()
            .decide(&ctx(Some("lightdm"), None, false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::SessionAlreadyEstablished));
        assert_eq!(probes.capability_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_with_fingerprint_disabled_requires_password() {
        let config = ClassifierConfig {
            login_fingerprint_enabled: false,
            ..ClassifierConfig::default()
        };
        let probes = FakeProbes::ready();

        let verdict = Classifier::new(config)
            .decide(&ctx(Some("gdm"), None, false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::LoginRequiresPassword));
    }

    #[tokio::test]
    async fn test_login_with_encrypted_home_requires_password() {
        let mut probes = FakeProbes::ready();
        probes.encrypted_home = true;

        let verdict = classifier()
            .decide(&ctx(Some("lightdm"), None, false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::LoginRequiresPassword));
    }

    #[tokio::test]
    async fn test_display_manager_parent_counts_as_login() {
        let mut probes = FakeProbes::ready();
        probes.encrypted_home = true;

        let verdict = classifier()
            .decide(
                &ctx(Some("unlock-agent"), Some("gdm-session-wor"), false, true),
                &probes,
                &probes,
            )
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::LoginRequiresPassword));
    }

    #[tokio::test]
    async fn test_encrypted_home_outside_login_proceeds() {
        let mut probes = FakeProbes::ready();
        probes.encrypted_home = true;

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Proceed);
    }

    #[tokio::test]
    async fn test_local_sudo_proceeds() {
        let probes = FakeProbes::ready();

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Proceed);
    }

    #[tokio::test]
    async fn test_unready_service_skips() {
        let mut probes = FakeProbes::ready();
        probes.service_ready = false;

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::ServiceUnavailable));
    }

    #[tokio::test]
    async fn test_missing_enrollment_skips() {
        let mut probes = FakeProbes::ready();
        probes.enrolled = false;

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::NoEnrollment));
    }

    #[tokio::test]
    async fn test_failed_session_probe_reads_as_no_session() {
        let mut probes = FakeProbes::ready();
        probes.sessions_fail = true;

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Proceed);
    }

    #[tokio::test]
    async fn test_failed_capability_probe_skips() {
        let mut probes = FakeProbes::ready();
        probes.capability_fail = true;

        let verdict = classifier()
            .decide(&ctx(Some("sudo"), Some("bash"), false, true), &probes, &probes)
            .await;

        assert_eq!(verdict, Verdict::Skip(SkipReason::ServiceUnavailable));
    }

    #[tokio::test]
    async fn test_decide_is_idempotent() {
        let probes = FakeProbes::ready();
        let context = ctx(Some("sudo"), Some("bash"), false, true);
        let classifier = classifier();

        let first = classifier.decide(&context, &probes, &probes).await;
        let second = classifier.decide(&context, &probes, &probes).await;

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn test_decide_is_total_and_deterministic(
            service in proptest::option::of("[a-z]{1,10}"),
            parent in proptest::option::of("[a-z]{1,10}"),
            remote in any::<bool>(),
            interactive in any::<bool>(),
            active_session in any::<bool>(),
            encrypted_home in any::<bool>(),
            service_ready in any::<bool>(),
            enrolled in any::<bool>(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let checked: std::result::Result<(), TestCaseError> = rt.block_on(async {
                let probes = FakeProbes {
                    active_session,
                    encrypted_home,
                    service_ready,
                    enrolled,
                    ..Default::default()
                };
                let context = SessionContext::new(
                    "alice",
                    service.clone(),
                    parent.clone(),
                    remote,
                    interactive,
                )
                .unwrap();
                let classifier = classifier();

                let first = classifier.decide(&context, &probes, &probes).await;
                let second = classifier.decide(&context, &probes, &probes).await;
                prop_assert_eq!(first, second);
                Ok(())
            });
            checked?;
        }
    }
}
