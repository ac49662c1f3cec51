//! Application launcher
//!
//! Negotiates auth before a session exists and keeps a side table of live
//! sessions keyed by session id. Opening an application that already has a
//! session focuses it instead of negotiating again.

use crate::AppCore;
use crate::auth::AuthCredentials;
use crate::models::{Application, LaunchOutcome, LaunchSession};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Live launch sessions.
#[derive(Default)]
pub struct LaunchSessions {
    sessions: RwLock<HashMap<Uuid, LaunchSession>>,
}

impl LaunchSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `session` unless its application already has one.
    ///
    /// Returns the session that ends up registered and whether it is new.
    fn insert_or_existing(&self, session: LaunchSession) -> (LaunchSession, bool) {
        let mut sessions = self.sessions.write();
        if let Some(existing) = sessions.values().find(|s| s.app_id == session.app_id) {
            return (existing.clone(), false);
        }
        sessions.insert(session.id, session.clone());
        (session, true)
    }

    pub fn find_by_app(&self, app_id: &str) -> Option<LaunchSession> {
        self.sessions
            .read()
            .values()
            .find(|session| session.app_id == app_id)
            .cloned()
    }

    pub fn close(&self, id: &Uuid) -> Option<LaunchSession> {
        self.sessions.write().remove(id)
    }

    /// Credentials a session hands to its own HTTP auth challenge handler.
    pub fn answer_challenge(&self, id: &Uuid) -> Option<AuthCredentials> {
        self.sessions
            .read()
            .get(id)
            .and_then(|session| session.credentials.clone())
    }
}

/// Open an application, negotiating Basic-Auth first.
///
/// Never fails: cancellation and errors come back as outcomes.
pub async fn open_application(core: &Arc<AppCore>, app: &Application) -> LaunchOutcome {
    if !app.enabled {
        return LaunchOutcome::Failed {
            app_id: app.id.clone(),
            message: format!("Application {} is disabled", app.name),
        };
    }

    if let Some(session) = core.sessions.find_by_app(&app.id) {
        info!(app = %app.id, session = %session.id, "Focusing existing session");
        return LaunchOutcome::Focused { session };
    }

    if let Err(error) = url::Url::parse(&app.url) {
        return LaunchOutcome::Failed {
            app_id: app.id.clone(),
            message: format!("Invalid application URL {}: {}", app.url, error),
        };
    }

    info!(app = %app.id, url = %app.url, "Opening application");
    let credentials = match core.auth.check_auth_and_get_credentials(&app.url, None).await {
        Ok(credentials) => credentials,
        Err(error) if error.is_cancelled() => {
            info!(app = %app.id, "Login cancelled, not opening application");
            return LaunchOutcome::Aborted {
                app_id: app.id.clone(),
            };
        }
        Err(error) => {
            warn!(app = %app.id, error = %error, "Could not open application");
            return LaunchOutcome::Failed {
                app_id: app.id.clone(),
                message: format!("Could not open application: {}", error),
            };
        }
    };

    let session = LaunchSession::new(&app.id, &app.name, &app.url, credentials);
    match core.sessions.insert_or_existing(session) {
        (session, true) => {
            info!(
                app = %app.id,
                session = %session.id,
                authenticated = session.is_authenticated(),
                "Application session opened"
            );
            LaunchOutcome::Opened { session }
        }
        (session, false) => LaunchOutcome::Focused { session },
    }
}

/// Close a session. Returns false if it was already gone.
pub fn close_session(core: &Arc<AppCore>, id: &Uuid) -> bool {
    match core.sessions.close(id) {
        Some(session) => {
            info!(app = %session.app_id, session = %id, "Application session closed");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_session_per_application() {
        let sessions = LaunchSessions::new();
        let first = LaunchSession::new("gama", "GAMA", "https://device.local", None);
        let second = LaunchSession::new("gama", "GAMA", "https://device.local", None);

        let (registered, created) = sessions.insert_or_existing(first.clone());
        assert!(created);
        assert_eq!(registered.id, first.id);

        let (registered, created) = sessions.insert_or_existing(second);
        assert!(!created);
        assert_eq!(registered.id, first.id);
        assert_eq!(sessions.find_by_app("gama").map(|s| s.id), Some(first.id));
    }

    #[test]
    fn test_answer_challenge_uses_session_credentials() {
        let sessions = LaunchSessions::new();
        let credentials = AuthCredentials::new("admin", "admin", true);
        let session = LaunchSession::new(
            "gama",
            "GAMA",
            "https://device.local",
            Some(credentials.clone()),
        );
        let id = session.id;
        sessions.insert_or_existing(session);

        assert_eq!(sessions.answer_challenge(&id), Some(credentials));
        assert!(sessions.close(&id).is_some());
        assert!(sessions.answer_challenge(&id).is_none());
        assert!(sessions.find_by_app("gama").is_none());
    }
}
