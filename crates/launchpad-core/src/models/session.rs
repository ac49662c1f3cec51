use crate::auth::AuthCredentials;
use serde::Serialize;
use uuid::Uuid;

/// A live, authenticated browsing session for one application.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchSession {
    pub id: Uuid,
    pub app_id: String,
    pub name: String,
    pub url: String,
    pub opened_at: i64,
    /// Credentials used to answer the session's own HTTP auth challenges
    #[serde(skip)]
    pub credentials: Option<AuthCredentials>,
}

impl LaunchSession {
    pub fn new(app_id: &str, name: &str, url: &str, credentials: Option<AuthCredentials>) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_id: app_id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            opened_at: chrono::Utc::now().timestamp_millis(),
            credentials,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}

/// What happened when an application was opened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// A new session was created
    Opened { session: LaunchSession },
    /// A session for the application already existed
    Focused { session: LaunchSession },
    /// The user cancelled the login; nothing was opened
    Aborted { app_id: String },
    /// The application could not be opened
    Failed { app_id: String, message: String },
}
