pub mod auth;
pub mod error;
pub mod models;
pub mod services;

pub use error::AuthError;
pub use launchpad_storage::{KEYCHAIN_SUPPORTED, KeySource, MasterKey, Storage, paths};
pub use models::*;

use anyhow::Result;
use auth::{AuthConfig, AuthOrchestrator, HttpProbe, LoginPresenter, ProbeClient};
use launchpad_storage::resolve_master_key;
use services::LaunchSessions;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Core application state shared by every front end
///
/// Wires the credential store, probe client and login presenter into one
/// orchestrator at startup.
pub struct AppCore {
    pub storage: Arc<Storage>,
    pub probe: Arc<dyn HttpProbe>,
    pub auth: Arc<AuthOrchestrator>,
    pub sessions: LaunchSessions,
    sweeper: Option<JoinHandle<()>>,
}

impl AppCore {
    pub async fn new(
        db_path: impl AsRef<Path>,
        config: AuthConfig,
        presenter: Arc<dyn LoginPresenter>,
    ) -> Result<Self> {
        let master_key = resolve_master_key(&config.keychain_service);
        let storage = Arc::new(Storage::open(
            db_path,
            &master_key,
            config.credential_retention_days,
        )?);
        let probe: Arc<dyn HttpProbe> = Arc::new(ProbeClient::new(&config)?);

        info!(key_source = %storage.key_source(), "Initializing Launchpad");

        Ok(Self::with_components(storage, probe, presenter, config))
    }

    /// Assemble a core from already-built parts.
    ///
    /// Starts the challenge sweeper when a challenge timeout is configured,
    /// so it must run inside a tokio runtime in that case.
    pub fn with_components(
        storage: Arc<Storage>,
        probe: Arc<dyn HttpProbe>,
        presenter: Arc<dyn LoginPresenter>,
        config: AuthConfig,
    ) -> Self {
        let auth = Arc::new(AuthOrchestrator::new(
            storage.credentials.clone(),
            probe.clone(),
            presenter,
            config,
        ));
        let sweeper = auth.spawn_challenge_sweeper();

        Self {
            storage,
            probe,
            auth,
            sessions: LaunchSessions::new(),
            sweeper,
        }
    }
}

impl Drop for AppCore {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
