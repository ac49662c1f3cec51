use launchpad_storage::{DEFAULT_KEYCHAIN_SERVICE, DEFAULT_RETENTION_DAYS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for credential negotiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Days a remembered credential stays valid without being rewritten
    #[serde(default = "default_retention_days")]
    pub credential_retention_days: u32,
    /// Timeout for auth probes and connectivity checks
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Default timeout for every other request the probe client makes
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed devices on closed networks)
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// Abandon a login prompt after this many seconds. Unset waits indefinitely.
    ///
    /// Expired prompts get a close command; a terminal prompt already reading
    /// input discards the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_timeout_secs: Option<u64>,
    /// Keychain service holding the credential store key
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_request_timeout() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_keychain_service() -> String {
    DEFAULT_KEYCHAIN_SERVICE.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credential_retention_days: default_retention_days(),
            probe_timeout_secs: default_probe_timeout(),
            request_timeout_secs: default_request_timeout(),
            accept_invalid_certs: true,
            challenge_timeout_secs: None,
            keychain_service: default_keychain_service(),
        }
    }
}

impl AuthConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn challenge_timeout(&self) -> Option<Duration> {
        self.challenge_timeout_secs.map(Duration::from_secs)
    }
}
