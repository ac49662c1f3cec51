//! Master key resolution for the credential store.
//!
//! The key lives in the OS keychain when the `keychain` feature is enabled
//! (the CLI's default) and the platform secret service answers. Otherwise a
//! fixed passphrase embedded in the binary is used.

use crate::encryption::derive_key;
use anyhow::Result;
use tracing::{info, warn};

pub const DEFAULT_KEYCHAIN_SERVICE: &str = "launchpad";
const KEYCHAIN_ACCOUNT: &str = "credential-store-key";

/// Skip the OS keychain even when support is compiled in.
pub const DISABLE_KEYCHAIN_ENV: &str = "LAUNCHPAD_DISABLE_KEYCHAIN";

/// Whether this build can reach the OS keychain at all.
pub const KEYCHAIN_SUPPORTED: bool = cfg!(feature = "keychain");

// WARNING: this fallback is NOT a secret. Anyone with the binary can derive it
// and decrypt a store written while the keychain was unavailable. It is kept
// so the launcher still works on hosts without a secret service. Needs product
// sign-off before release builds rely on it.
const FALLBACK_PASSPHRASE: &str = "launchpad:basic-auth-store:fallback-key:v1";

/// Where the active master key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Fallback,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Keychain => write!(f, "keychain"),
            KeySource::Fallback => write!(f, "fallback"),
        }
    }
}

/// 32-byte AES key plus its provenance.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; 32],
    source: KeySource,
}

impl MasterKey {
    pub fn bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Key derived from the embedded fallback passphrase.
    pub fn fallback() -> Self {
        Self {
            bytes: derive_key(FALLBACK_PASSPHRASE),
            source: KeySource::Fallback,
        }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Resolve the store master key, preferring the OS keychain.
pub fn resolve_master_key(service: &str) -> MasterKey {
    if std::env::var_os(DISABLE_KEYCHAIN_ENV).is_some() {
        warn!(
            env = DISABLE_KEYCHAIN_ENV,
            "OS keychain disabled, credential store uses the embedded fallback key"
        );
        return MasterKey::fallback();
    }

    match get_or_create_master_key(service, KEYCHAIN_ACCOUNT) {
        Ok(bytes) => {
            info!(service, "Using keychain-backed credential store key");
            MasterKey {
                bytes,
                source: KeySource::Keychain,
            }
        }
        Err(error) => {
            warn!(
                %error,
                "OS keychain unavailable, credential store uses the embedded fallback key"
            );
            MasterKey::fallback()
        }
    }
}

#[cfg(feature = "keychain")]
pub fn get_or_create_master_key(service: &str, account: &str) -> Result<[u8; 32]> {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use rand::Rng;

    let entry = keyring::Entry::new(service, account)?;
    match entry.get_password() {
        Ok(encoded) => {
            let key_data = STANDARD.decode(encoded.trim())?;
            if key_data.len() != 32 {
                anyhow::bail!("Keychain master key must be 32 bytes");
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&key_data);
            Ok(key)
        }
        Err(keyring::Error::NoEntry) => {
            let mut key = [0u8; 32];
            rand::rng().fill_bytes(&mut key);
            entry.set_password(&STANDARD.encode(key))?;
            Ok(key)
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(not(feature = "keychain"))]
pub fn get_or_create_master_key(_service: &str, _account: &str) -> Result<[u8; 32]> {
    anyhow::bail!("Keychain support not compiled in")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_key_is_deterministic() {
        let a = MasterKey::fallback();
        let b = MasterKey::fallback();
        assert_eq!(a.bytes(), b.bytes());
        assert_eq!(a.source(), KeySource::Fallback);
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let rendered = format!("{:?}", MasterKey::fallback());
        assert!(rendered.contains("Fallback"));
        assert!(!rendered.contains("bytes"));
    }

    #[test]
    fn fallback_key_is_hashed_passphrase() {
        assert_eq!(MasterKey::fallback().bytes(), &derive_key(FALLBACK_PASSPHRASE));
    }

    #[cfg(not(feature = "keychain"))]
    #[test]
    fn resolves_to_fallback_without_keychain() {
        assert!(!KEYCHAIN_SUPPORTED);
        let key = resolve_master_key(DEFAULT_KEYCHAIN_SERVICE);
        assert_eq!(key.source(), KeySource::Fallback);
    }

    #[test]
    fn env_override_skips_keychain() {
        unsafe { std::env::set_var(DISABLE_KEYCHAIN_ENV, "1") };
        let key = resolve_master_key("launchpad-test-never-created");
        unsafe { std::env::remove_var(DISABLE_KEYCHAIN_ENV) };
        assert_eq!(key.source(), KeySource::Fallback);
    }
}
