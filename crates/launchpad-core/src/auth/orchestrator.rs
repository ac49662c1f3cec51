//! Authentication Orchestrator
//!
//! Decides, per URL, whether a Basic-Auth login is needed and produces the
//! credentials to answer it with:
//!
//! 1. Stored credentials are re-validated against the server before use.
//!    Rejected ones are purged.
//! 2. An anonymous probe decides whether the server wants auth at all.
//! 3. Concurrent callers for one URL share a single pending challenge and
//!    a single login prompt.
//! 4. The prompt owner waits for `resolve_login`, persists remembered
//!    credentials and hands them back.

use super::config::AuthConfig;
use super::pending::{ChallengeOutcome, PendingAuthRegistry, PendingAuthSummary};
use super::presenter::LoginPresenter;
use super::probe::HttpProbe;
use super::types::{AuthCredentials, LoginRequest, ValidationResult};
use crate::error::{AuthError, Result};
use launchpad_storage::{CredentialStorage, host_key};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Authentication Orchestrator
///
/// Owns the pending challenge registry. The credential store, probe client
/// and presenter are injected at construction.
pub struct AuthOrchestrator {
    store: Arc<CredentialStorage>,
    probe: Arc<dyn HttpProbe>,
    presenter: Arc<dyn LoginPresenter>,
    pending: PendingAuthRegistry,
    config: AuthConfig,
}

impl AuthOrchestrator {
    pub fn new(
        store: Arc<CredentialStorage>,
        probe: Arc<dyn HttpProbe>,
        presenter: Arc<dyn LoginPresenter>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            probe,
            presenter,
            pending: PendingAuthRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn pending_logins(&self) -> Vec<PendingAuthSummary> {
        self.pending.list()
    }

    pub fn pending_login(&self, url: &str) -> Option<PendingAuthSummary> {
        self.pending.get(url)
    }

    /// Get credentials for `url`, prompting the user if the server demands them.
    ///
    /// Returns `Ok(None)` when the server does not require authentication.
    pub async fn check_auth_and_get_credentials(
        &self,
        url: &str,
        realm: Option<&str>,
    ) -> Result<Option<AuthCredentials>> {
        let host = host_key(url);

        if let Some(credentials) = self.revalidate_stored(url, &host).await? {
            return Ok(Some(credentials));
        }

        if !self.auth_required(url, &host).await {
            debug!(host = %host, "Server does not require authentication");
            return Ok(None);
        }

        self.prompt_for_credentials(url, &host, realm)
            .await
            .map(Some)
    }

    /// Stored-credential fast path.
    async fn revalidate_stored(&self, url: &str, host: &str) -> Result<Option<AuthCredentials>> {
        let Some(stored) = self.store.get(url)? else {
            return Ok(None);
        };

        let result = self
            .probe
            .test_basic_auth(url, &stored.username, &stored.password)
            .await;

        if result.success {
            info!(host = %host, "Using stored credentials");
            return Ok(Some(stored.into()));
        }

        if result.is_transport_failure() {
            warn!(host = %host, "Could not reach server to re-validate stored credentials");
            return Err(AuthError::Network {
                url: url.to_string(),
                message: result
                    .error
                    .unwrap_or_else(|| "Connection failed".to_string()),
            });
        }

        info!(
            host = %host,
            status = result.status,
            "Stored credentials rejected, removing"
        );
        self.store.delete(Some(url))?;
        Ok(None)
    }

    /// Anonymous probe. Unreachable servers are assumed to require auth.
    async fn auth_required(&self, url: &str, host: &str) -> bool {
        let result = self.probe.test_basic_auth(url, "", "").await;

        if result.is_transport_failure() {
            warn!(
                host = %host,
                error = result.error.as_deref().unwrap_or_default(),
                "Auth probe failed, assuming authentication is required"
            );
            return true;
        }

        result.requires_auth()
    }

    async fn prompt_for_credentials(
        &self,
        url: &str,
        host: &str,
        realm: Option<&str>,
    ) -> Result<AuthCredentials> {
        let challenge = self.pending.join_or_create(url, realm);

        if !challenge.is_owner() {
            info!(host = %host, challenge = challenge.id(), "Joining pending login");
            return into_credentials(url, challenge.outcome().await);
        }

        let _guard = ChallengeGuard {
            registry: &self.pending,
            url,
            id: challenge.id().to_string(),
        };

        let request = LoginRequest {
            id: challenge.id().to_string(),
            url: url.to_string(),
            realm: realm.map(str::to_string),
        };

        info!(host = %host, challenge = %request.id, "Opening login prompt");
        if let Err(error) = self.presenter.open(&request).await {
            warn!(host = %host, error = %error, "Failed to open login prompt");
            let message = error.to_string();
            self.pending
                .resolve_if(url, &request.id, ChallengeOutcome::Failed(message.clone()));
            return Err(AuthError::Prompt {
                url: url.to_string(),
                message,
            });
        }

        let credentials = into_credentials(url, challenge.outcome().await)?;

        if credentials.remember {
            match self
                .store
                .put(url, &credentials.username, &credentials.password)
            {
                Ok(_) => info!(host = %host, "Remembered credentials"),
                Err(error) => warn!(host = %host, error = %error, "Failed to remember credentials"),
            }
        }

        Ok(credentials)
    }

    /// Live round trip used by the submission boundary before `resolve_login`.
    pub async fn validate_credentials_with_server(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> ValidationResult {
        let result = self.probe.test_basic_auth(url, username, password).await;
        debug!(
            host = %host_key(url),
            status = result.status,
            success = result.success,
            "Validated submitted credentials"
        );
        result.into()
    }

    /// Resolve the URL's pending login.
    ///
    /// `None` means the user cancelled. The prompt is only told to close when
    /// `validation_passed` is set. Returns false if nothing was pending.
    pub async fn resolve_login(
        &self,
        url: &str,
        credentials: Option<AuthCredentials>,
        validation_passed: bool,
    ) -> bool {
        let host = host_key(url);
        let cancelled = credentials.is_none();
        let outcome = match credentials {
            Some(credentials) => ChallengeOutcome::Credentials(credentials),
            None => ChallengeOutcome::Cancelled,
        };

        let Some(id) = self.pending.resolve(url, outcome) else {
            warn!(
                host = %host,
                pending = self.pending.len(),
                "No pending login to resolve"
            );
            return false;
        };

        if cancelled {
            info!(host = %host, challenge = %id, "Login cancelled by user");
        } else if validation_passed {
            info!(host = %host, challenge = %id, "Login resolved");
            if let Err(error) = self.presenter.close(url).await {
                warn!(host = %host, error = %error, "Failed to close login prompt");
            }
        } else {
            info!(host = %host, challenge = %id, "Login resolved without validation, prompt left open");
        }

        true
    }

    /// The prompt for `url` went away without a submit or cancel.
    pub fn prompt_closed(&self, url: &str) -> bool {
        match self.pending.resolve(url, ChallengeOutcome::Cancelled) {
            Some(id) => {
                info!(host = %host_key(url), challenge = %id, "Login prompt closed, cancelling");
                true
            }
            None => false,
        }
    }

    /// Cancel every challenge older than `max_age` and close its prompt.
    pub async fn expire_stale_challenges(&self, max_age: Duration) -> usize {
        let expired = self.pending.expire_older_than(max_age);
        for challenge in &expired {
            info!(
                host = %host_key(&challenge.url),
                challenge = %challenge.id,
                "Login challenge expired"
            );
            if let Err(error) = self.presenter.close(&challenge.url).await {
                warn!(url = %challenge.url, error = %error, "Failed to close expired login prompt");
            }
        }
        expired.len()
    }

    /// Start the periodic challenge sweep if a challenge timeout is configured.
    ///
    /// The task stops once the orchestrator is dropped.
    pub fn spawn_challenge_sweeper(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let max_age = self.config.challenge_timeout()?;
        let orchestrator = Arc::downgrade(self);

        info!(timeout_secs = max_age.as_secs(), "Starting login challenge sweeper");
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(orchestrator) = orchestrator.upgrade() else {
                    break;
                };
                orchestrator.expire_stale_challenges(max_age).await;
            }
        }))
    }
}

/// Removes the owner's entry on every exit path, including a dropped future.
struct ChallengeGuard<'a> {
    registry: &'a PendingAuthRegistry,
    url: &'a str,
    id: String,
}

impl Drop for ChallengeGuard<'_> {
    fn drop(&mut self) {
        let abandoned = ChallengeOutcome::Failed("Login negotiation was abandoned".to_string());
        if self.registry.resolve_if(self.url, &self.id, abandoned) {
            debug!(url = %self.url, challenge = %self.id, "Abandoned login challenge removed");
        }
    }
}

fn into_credentials(url: &str, outcome: ChallengeOutcome) -> Result<AuthCredentials> {
    match outcome {
        ChallengeOutcome::Credentials(credentials) => Ok(credentials),
        ChallengeOutcome::Cancelled => Err(AuthError::UserCancelled {
            url: url.to_string(),
        }),
        ChallengeOutcome::Failed(message) => Err(AuthError::Prompt {
            url: url.to_string(),
            message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::presenter::{ChannelPresenter, PresenterCommand};
    use crate::auth::types::BasicAuthResult;
    use async_trait::async_trait;
    use futures::future::join_all;
    use launchpad_storage::{MasterKey, Storage};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    const URL: &str = "https://device.local/app";
    const WAIT: Duration = Duration::from_secs(5);

    /// In-memory server: open or protected, accepting a fixed set of logins.
    #[derive(Default)]
    struct ScriptedProbe {
        protected: AtomicBool,
        unreachable: AtomicBool,
        accepted: Mutex<Vec<(String, String)>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedProbe {
        fn protected_with(username: &str, password: &str) -> Arc<Self> {
            let probe = Self::default();
            probe.protected.store(true, Ordering::SeqCst);
            probe.accept(username, password);
            Arc::new(probe)
        }

        fn accept(&self, username: &str, password: &str) {
            self.accepted
                .lock()
                .push((username.to_string(), password.to_string()));
        }

        fn reject_all(&self) {
            self.accepted.lock().clear();
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn test_basic_auth(&self, _url: &str, username: &str, password: &str) -> BasicAuthResult {
            self.calls
                .lock()
                .push((username.to_string(), password.to_string()));

            if self.unreachable.load(Ordering::SeqCst) {
                return BasicAuthResult::transport_failure("connection refused");
            }
            if !self.protected.load(Ordering::SeqCst) {
                return BasicAuthResult::from_status(200);
            }
            let accepted = self
                .accepted
                .lock()
                .iter()
                .any(|(u, p)| u == username && p == password);
            BasicAuthResult::from_status(if accepted { 200 } else { 401 })
        }

        async fn check_connectivity(&self, _url: &str) -> crate::auth::ConnectivityResult {
            unreachable!("not used by the orchestrator")
        }
    }

    struct FailingPresenter;

    #[async_trait]
    impl LoginPresenter for FailingPresenter {
        async fn open(&self, _request: &LoginRequest) -> anyhow::Result<()> {
            anyhow::bail!("no display")
        }

        async fn close(&self, _url: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        orchestrator: Arc<AuthOrchestrator>,
        probe: Arc<ScriptedProbe>,
        store: Arc<CredentialStorage>,
        prompts: mpsc::UnboundedReceiver<PresenterCommand>,
        _temp_dir: TempDir,
    }

    fn harness(probe: Arc<ScriptedProbe>) -> Harness {
        harness_with_config(probe, AuthConfig::default())
    }

    fn harness_with_config(probe: Arc<ScriptedProbe>, config: AuthConfig) -> Harness {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(
            temp_dir.path().join("credentials.db"),
            &MasterKey::fallback(),
            config.credential_retention_days,
        )
        .unwrap();
        let (presenter, prompts) = ChannelPresenter::new();
        let orchestrator = Arc::new(AuthOrchestrator::new(
            storage.credentials.clone(),
            probe.clone(),
            Arc::new(presenter),
            config,
        ));

        Harness {
            orchestrator,
            probe,
            store: storage.credentials,
            prompts,
            _temp_dir: temp_dir,
        }
    }

    impl Harness {
        fn spawn_check(&self) -> JoinHandle<Result<Option<AuthCredentials>>> {
            self.spawn_check_for(URL)
        }

        fn spawn_check_for(&self, url: &'static str) -> JoinHandle<Result<Option<AuthCredentials>>> {
            let orchestrator = self.orchestrator.clone();
            tokio::spawn(async move { orchestrator.check_auth_and_get_credentials(url, None).await })
        }

        async fn expect_open(&mut self) -> LoginRequest {
            match tokio::time::timeout(WAIT, self.prompts.recv()).await {
                Ok(Some(PresenterCommand::Open(request))) => request,
                other => panic!("expected an open prompt, got {other:?}"),
            }
        }

        async fn wait_for_waiters(&self, count: usize) {
            tokio::time::timeout(WAIT, async {
                while self
                    .orchestrator
                    .pending_login(URL)
                    .map(|summary| summary.waiters)
                    != Some(count)
                {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .expect("callers never joined the pending login");
        }
    }

    fn admin() -> AuthCredentials {
        AuthCredentials::new("admin", "admin", true)
    }

    #[tokio::test]
    async fn test_open_server_needs_no_credentials() {
        let mut h = harness(Arc::new(ScriptedProbe::default()));

        let result = h
            .orchestrator
            .check_auth_and_get_credentials(URL, None)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(h.prompts.try_recv().is_err());
        assert!(h.orchestrator.pending_logins().is_empty());
    }

    #[tokio::test]
    async fn test_first_login_is_validated_and_remembered() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();

        let request = h.expect_open().await;
        assert_eq!(request.url, URL);

        let validation = h
            .orchestrator
            .validate_credentials_with_server(URL, "admin", "admin")
            .await;
        assert!(validation.valid);
        assert_eq!(validation.status, Some(200));
        assert!(h.orchestrator.resolve_login(URL, Some(admin()), true).await);

        let credentials = task.await.unwrap().unwrap();
        assert_eq!(credentials, Some(admin()));
        assert_eq!(
            h.prompts.recv().await,
            Some(PresenterCommand::Close { url: URL.to_string() })
        );

        let stored = h.store.get(URL).unwrap().unwrap();
        assert_eq!(stored.host, "device.local");
        assert_eq!(stored.username, "admin");
        assert_eq!(stored.password, "admin");
    }

    #[tokio::test]
    async fn test_valid_stored_credentials_skip_prompt() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        h.store.put(URL, "admin", "admin").unwrap();

        let credentials = h
            .orchestrator
            .check_auth_and_get_credentials(URL, None)
            .await
            .unwrap();

        assert_eq!(credentials, Some(admin()));
        assert_eq!(h.probe.call_count(), 1);
        assert!(h.prompts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejected_stored_credentials_are_purged() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "rotated"));
        h.store.put(URL, "admin", "admin").unwrap();
        let task = h.spawn_check();

        h.expect_open().await;
        assert!(h.store.get(URL).unwrap().is_none());
        assert!(!h.store.has(URL).unwrap());

        let rotated = AuthCredentials::new("admin", "rotated", true);
        assert!(h.orchestrator.resolve_login(URL, Some(rotated.clone()), true).await);
        assert_eq!(task.await.unwrap().unwrap(), Some(rotated));
        assert_eq!(h.store.get(URL).unwrap().unwrap().password, "rotated");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_prompt() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));

        let orchestrator = h.orchestrator.clone();
        let callers = tokio::spawn(async move {
            join_all((0..5).map(|_| orchestrator.check_auth_and_get_credentials(URL, None))).await
        });

        h.expect_open().await;
        h.wait_for_waiters(5).await;
        assert!(h.orchestrator.resolve_login(URL, Some(admin()), true).await);

        let results = callers.await.unwrap();
        assert_eq!(results.len(), 5);
        for result in results {
            assert_eq!(result.unwrap(), Some(admin()));
        }

        assert_eq!(
            h.prompts.recv().await,
            Some(PresenterCommand::Close { url: URL.to_string() })
        );
        assert!(h.prompts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_cancellation() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));

        let orchestrator = h.orchestrator.clone();
        let callers = tokio::spawn(async move {
            join_all((0..3).map(|_| orchestrator.check_auth_and_get_credentials(URL, None))).await
        });

        h.expect_open().await;
        h.wait_for_waiters(3).await;
        assert!(h.orchestrator.resolve_login(URL, None, false).await);

        for result in callers.await.unwrap() {
            assert!(result.unwrap_err().is_cancelled());
        }
    }

    #[tokio::test]
    async fn test_distinct_urls_resolve_independently() {
        const FIRST: &str = "https://a.local/app";
        const SECOND: &str = "https://b.local/app";

        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let first = h.spawn_check_for(FIRST);
        let second = h.spawn_check_for(SECOND);

        let opened = [h.expect_open().await, h.expect_open().await];
        assert_ne!(opened[0].id, opened[1].id);
        let mut urls: Vec<_> = opened.iter().map(|request| request.url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, [FIRST, SECOND]);
        assert_eq!(h.orchestrator.pending_logins().len(), 2);

        let operator = AuthCredentials::new("operator", "secret", true);
        assert!(h.orchestrator.resolve_login(SECOND, Some(operator.clone()), true).await);
        assert_eq!(second.await.unwrap().unwrap(), Some(operator));
        assert_eq!(
            h.prompts.recv().await,
            Some(PresenterCommand::Close { url: SECOND.to_string() })
        );

        assert!(!first.is_finished());
        assert!(h.orchestrator.pending_login(FIRST).is_some());
        assert!(h.orchestrator.pending_login(SECOND).is_none());

        assert!(h.orchestrator.resolve_login(FIRST, None, false).await);
        assert!(first.await.unwrap().unwrap_err().is_cancelled());
        assert!(h.orchestrator.pending_logins().is_empty());
        assert!(h.prompts.try_recv().is_err());

        assert_eq!(h.store.get(SECOND).unwrap().unwrap().username, "operator");
        assert!(h.store.get(FIRST).unwrap().is_none());
        assert_eq!(h.store.list_hosts().unwrap(), ["b.local"]);
    }

    #[tokio::test]
    async fn test_invalid_submission_keeps_prompt_open() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        let request = h.expect_open().await;

        let validation = h
            .orchestrator
            .validate_credentials_with_server(URL, "admin", "wrong")
            .await;
        assert!(!validation.valid);
        assert_eq!(validation.status, Some(401));

        let pending = h.orchestrator.pending_login(URL).unwrap();
        assert_eq!(pending.id, request.id);
        assert!(h.prompts.try_recv().is_err());
        assert!(!task.is_finished());

        assert!(h.orchestrator.resolve_login(URL, Some(admin()), true).await);
        assert_eq!(task.await.unwrap().unwrap(), Some(admin()));
    }

    #[tokio::test]
    async fn test_cancel_fails_caller_and_clears_entry() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        let first = h.expect_open().await;

        assert!(h.orchestrator.resolve_login(URL, None, false).await);
        let error = task.await.unwrap().unwrap_err();
        assert!(matches!(error, AuthError::UserCancelled { ref url } if url == URL));
        assert!(h.orchestrator.pending_login(URL).is_none());
        assert!(h.prompts.try_recv().is_err());

        let retry = h.spawn_check();
        let second = h.expect_open().await;
        assert_ne!(first.id, second.id);

        assert!(h.orchestrator.resolve_login(URL, None, false).await);
        assert!(retry.await.unwrap().unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_resolve_without_pending_login_is_noop() {
        let h = harness(ScriptedProbe::protected_with("admin", "admin"));
        assert!(!h.orchestrator.resolve_login(URL, Some(admin()), true).await);
        assert!(!h.orchestrator.resolve_login(URL, None, false).await);
        assert!(!h.orchestrator.prompt_closed(URL));
    }

    #[tokio::test]
    async fn test_unvalidated_resolution_does_not_close_prompt() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        h.expect_open().await;

        assert!(h.orchestrator.resolve_login(URL, Some(admin()), false).await);
        assert_eq!(task.await.unwrap().unwrap(), Some(admin()));
        assert!(h.prompts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_prompt_closed_cancels() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        h.expect_open().await;

        assert!(h.orchestrator.prompt_closed(URL));
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
        assert!(h.orchestrator.pending_logins().is_empty());
    }

    #[tokio::test]
    async fn test_forget_me_is_not_persisted() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        h.expect_open().await;

        let once = AuthCredentials::new("admin", "admin", false);
        assert!(h.orchestrator.resolve_login(URL, Some(once.clone()), true).await);
        assert_eq!(task.await.unwrap().unwrap(), Some(once));
        assert!(h.store.list_hosts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_probe_assumes_auth_required() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        h.probe.unreachable.store(true, Ordering::SeqCst);
        let task = h.spawn_check();

        h.expect_open().await;
        assert!(h.orchestrator.resolve_login(URL, None, false).await);
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_unreachable_revalidation_is_network_error() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        h.store.put(URL, "admin", "admin").unwrap();
        h.probe.unreachable.store(true, Ordering::SeqCst);

        let error = h
            .orchestrator
            .check_auth_and_get_credentials(URL, None)
            .await
            .unwrap_err();

        assert!(matches!(error, AuthError::Network { .. }));
        assert!(h.store.has(URL).unwrap());
        assert!(h.prompts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_presenter_failure_fails_challenge() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(
            temp_dir.path().join("credentials.db"),
            &MasterKey::fallback(),
            30,
        )
        .unwrap();
        let orchestrator = AuthOrchestrator::new(
            storage.credentials.clone(),
            ScriptedProbe::protected_with("admin", "admin"),
            Arc::new(FailingPresenter),
            AuthConfig::default(),
        );

        let error = orchestrator
            .check_auth_and_get_credentials(URL, Some("device"))
            .await
            .unwrap_err();

        assert!(matches!(error, AuthError::Prompt { ref message, .. } if message == "no display"));
        assert!(orchestrator.pending_logins().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_owner_removes_entry() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        h.expect_open().await;
        assert!(h.orchestrator.pending_login(URL).is_some());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(h.orchestrator.pending_login(URL).is_none());
    }

    #[tokio::test]
    async fn test_stale_challenges_expire() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        let task = h.spawn_check();
        h.expect_open().await;

        assert_eq!(
            h.orchestrator
                .expire_stale_challenges(Duration::from_secs(300))
                .await,
            0
        );
        assert_eq!(h.orchestrator.expire_stale_challenges(Duration::ZERO).await, 1);

        assert!(task.await.unwrap().unwrap_err().is_cancelled());
        assert_eq!(
            h.prompts.recv().await,
            Some(PresenterCommand::Close { url: URL.to_string() })
        );
    }

    #[tokio::test]
    async fn test_sweeper_only_runs_when_configured() {
        let h = harness(ScriptedProbe::protected_with("admin", "admin"));
        assert!(h.orchestrator.spawn_challenge_sweeper().is_none());

        let config = AuthConfig {
            challenge_timeout_secs: Some(300),
            ..AuthConfig::default()
        };
        let h = harness_with_config(ScriptedProbe::protected_with("admin", "admin"), config);
        let handle = h.orchestrator.spawn_challenge_sweeper().unwrap();
        handle.abort();
    }

    #[tokio::test]
    async fn test_rejection_after_rotation_reprompts_next_time() {
        let mut h = harness(ScriptedProbe::protected_with("admin", "admin"));
        h.store.put(URL, "admin", "admin").unwrap();
        assert_eq!(
            h.orchestrator
                .check_auth_and_get_credentials(URL, None)
                .await
                .unwrap(),
            Some(admin())
        );

        h.probe.reject_all();
        let task = h.spawn_check();
        h.expect_open().await;
        assert!(!h.store.has(URL).unwrap());

        assert!(h.orchestrator.prompt_closed(URL));
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
    }
}
