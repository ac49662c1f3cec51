//! Launchpad Storage - encrypted persistence for remembered credentials
//!
//! Uses redb as the embedded database. Credential records are sealed with
//! AES-256-GCM under a master key taken from the OS keychain when available.
//!
//! # Tables
//!
//! - `basic_auth_credentials` - host -> encrypted `{username, password, stored_at}`

pub mod credentials;
pub mod keychain;
pub mod paths;
pub mod time_utils;

mod encryption;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use credentials::{CredentialStorage, DEFAULT_RETENTION_DAYS, StoredCredential, host_key};
pub use encryption::CredentialCipher;
pub use keychain::{
    DEFAULT_KEYCHAIN_SERVICE, DISABLE_KEYCHAIN_ENV, KEYCHAIN_SUPPORTED, KeySource, MasterKey,
    resolve_master_key,
};

/// Central storage manager
pub struct Storage {
    pub credentials: Arc<CredentialStorage>,
    key_source: KeySource,
}

impl Storage {
    /// Open (or create) the credential database at the given path.
    ///
    /// Expired credentials are swept as part of opening.
    pub fn open(path: impl AsRef<Path>, master_key: &MasterKey, retention_days: u32) -> Result<Self> {
        let db = Arc::new(Database::create(path.as_ref())?);
        let cipher = CredentialCipher::new(master_key.bytes())?;
        let credentials = Arc::new(CredentialStorage::new(db, cipher, retention_days)?);

        Ok(Self {
            credentials,
            key_source: master_key.source(),
        })
    }

    /// Where the master key protecting this store came from.
    pub fn key_source(&self) -> KeySource {
        self.key_source
    }
}
