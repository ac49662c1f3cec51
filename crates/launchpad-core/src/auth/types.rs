//! Core types for basic-auth negotiation
//!
//! Defines transient credentials, probe results and the request/response
//! shapes used at the login prompt and settings boundaries.

use launchpad_storage::StoredCredential;
use serde::{Deserialize, Serialize};

/// Credentials resolved for one negotiation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCredentials {
    pub username: String,
    pub password: String,
    /// Whether the user asked for these to be persisted
    pub remember: bool,
}

impl AuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>, remember: bool) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember,
        }
    }
}

impl From<StoredCredential> for AuthCredentials {
    fn from(stored: StoredCredential) -> Self {
        Self {
            username: stored.username,
            password: stored.password,
            remember: true,
        }
    }
}

impl std::fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("remember", &self.remember)
            .finish()
    }
}

/// Outcome of a single Basic-Auth probe.
///
/// `status` is the HTTP status, or 0 when the request never got a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthResult {
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BasicAuthResult {
    pub fn from_status(status: u16) -> Self {
        Self {
            success: (200..400).contains(&status),
            status,
            error: None,
        }
    }

    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: 0,
            error: Some(error.into()),
        }
    }

    /// DNS, connect, TLS or timeout failure; no HTTP status was received.
    pub fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    pub fn requires_auth(&self) -> bool {
        self.status == 401
    }
}

/// Result of a reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityResult {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of validating credentials against the live server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// Validation could not reach the server, so nothing was confirmed either way.
    pub fn is_transport_failure(&self) -> bool {
        !self.valid && self.status.is_none()
    }
}

impl From<BasicAuthResult> for ValidationResult {
    fn from(result: BasicAuthResult) -> Self {
        if result.is_transport_failure() {
            return Self {
                valid: false,
                status: None,
                error: Some(
                    result
                        .error
                        .unwrap_or_else(|| "Validation failed".to_string()),
                ),
            };
        }
        Self {
            valid: result.success,
            status: Some(result.status),
            error: None,
        }
    }
}

/// What the presenter needs to render a login prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Challenge id, for correlating logs and presenter state
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
}

/// Login form submission.
#[derive(Clone, Serialize, Deserialize)]
pub struct SubmitLoginRequest {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_remember")]
    pub remember: bool,
}

fn default_remember() -> bool {
    true
}

impl std::fmt::Debug for SubmitLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitLoginRequest")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}

/// Login cancellation or prompt dismissal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelLoginRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSuccessResponse {
    pub success: bool,
    pub message: String,
}

impl AuthSuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
