//! Error types for authentication negotiation

use thiserror::Error;

/// Failures surfaced by the auth orchestrator and its boundaries.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The user dismissed a required login. Not a fault; callers abort quietly.
    #[error("User cancelled authentication for {url}")]
    UserCancelled { url: String },

    /// The server rejected submitted credentials. The prompt stays open.
    #[error("Invalid credentials for {url} (status {status})")]
    ValidationFailed { url: String, status: u16 },

    /// The server could not be reached to confirm credentials.
    #[error("Could not reach {url} to validate credentials: {message}")]
    Network { url: String, message: String },

    /// The login prompt could not be shown or was torn down with an error.
    #[error("Login prompt failed for {url}: {message}")]
    Prompt { url: String, message: String },

    #[error("Credential store error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AuthError::UserCancelled { .. })
    }
}

/// Result type alias for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;
