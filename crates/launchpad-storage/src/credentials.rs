//! Basic-auth credential storage - encrypted, host-keyed, age-limited.
//!
//! Each record is stored under its host key (`host[:port]`) and sealed with
//! AES-256-GCM. Records older than the retention window are purged when the
//! storage is opened and whenever a read finds one.

use crate::encryption::CredentialCipher;
use crate::time_utils::{DAY_MS, now_ms};
use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CREDENTIALS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("basic_auth_credentials");

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// A remembered credential set for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Epoch milliseconds of the last write.
    pub stored_at: i64,
}

impl StoredCredential {
    pub fn is_expired(&self, retention_ms: i64, now: i64) -> bool {
        self.stored_at < now - retention_ms
    }
}

/// Resolve a URL to its store key: the URL's `host[:port]`.
///
/// Default ports are omitted. Strings that do not parse as URLs are used as-is.
pub fn host_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Encrypted credential storage backed by redb.
pub struct CredentialStorage {
    db: Arc<Database>,
    cipher: CredentialCipher,
    retention_ms: i64,
}

impl CredentialStorage {
    /// Open the credential table and sweep expired records.
    pub fn new(db: Arc<Database>, cipher: CredentialCipher, retention_days: u32) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(CREDENTIALS_TABLE)?;
        write_txn.commit()?;

        let storage = Self {
            db,
            cipher,
            retention_ms: i64::from(retention_days) * DAY_MS,
        };

        let purged = storage.purge_expired()?;
        if purged > 0 {
            info!(purged, "Purged expired stored credentials");
        }

        Ok(storage)
    }

    /// Store credentials for the URL's host, replacing any previous record.
    pub fn put(&self, url: &str, username: &str, password: &str) -> Result<StoredCredential> {
        self.put_at(url, username, password, now_ms())
    }

    /// Store credentials with an explicit timestamp.
    pub fn put_at(
        &self,
        url: &str,
        username: &str,
        password: &str,
        stored_at: i64,
    ) -> Result<StoredCredential> {
        let record = StoredCredential {
            host: host_key(url),
            username: username.to_string(),
            password: password.to_string(),
            stored_at,
        };
        let sealed = self.cipher.seal(&record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS_TABLE)?;
            table.insert(record.host.as_str(), sealed.as_slice())?;
        }
        write_txn.commit()?;

        info!(host = %record.host, "Stored credentials");
        Ok(record)
    }

    /// Get the credentials for the URL's host, if present and not expired.
    pub fn get(&self, url: &str) -> Result<Option<StoredCredential>> {
        let host = host_key(url);
        let sealed = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(CREDENTIALS_TABLE)?;
            match table.get(host.as_str())? {
                Some(value) => value.value().to_vec(),
                None => {
                    debug!(%host, "No stored credentials found");
                    return Ok(None);
                }
            }
        };

        let record: StoredCredential = match self.cipher.open(&sealed) {
            Ok(record) => record,
            Err(error) => {
                warn!(%host, %error, "Stored credentials unreadable, removing");
                self.remove_host(&host)?;
                return Ok(None);
            }
        };

        if record.is_expired(self.retention_ms, now_ms()) {
            info!(%host, "Stored credentials expired, removing");
            self.remove_host(&host)?;
            return Ok(None);
        }

        debug!(%host, "Found stored credentials");
        Ok(Some(record))
    }

    /// Whether a live record exists for the URL's host.
    pub fn has(&self, url: &str) -> Result<bool> {
        Ok(self.get(url)?.is_some())
    }

    /// Delete the URL's host record, or every record when `url` is `None`.
    ///
    /// Returns the number of records removed.
    pub fn delete(&self, url: Option<&str>) -> Result<usize> {
        match url {
            Some(url) => {
                let host = host_key(url);
                let removed = usize::from(self.remove_host(&host)?);
                info!(%host, "Cleared stored credentials");
                Ok(removed)
            }
            None => {
                let hosts = self.list_hosts()?;
                let write_txn = self.db.begin_write()?;
                {
                    let mut table = write_txn.open_table(CREDENTIALS_TABLE)?;
                    for host in &hosts {
                        table.remove(host.as_str())?;
                    }
                }
                write_txn.commit()?;
                info!(count = hosts.len(), "Cleared all stored credentials");
                Ok(hosts.len())
            }
        }
    }

    /// List the hosts that currently have stored credentials.
    pub fn list_hosts(&self) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS_TABLE)?;

        let mut hosts = Vec::new();
        for item in table.iter()? {
            let (key, _) = item?;
            hosts.push(key.value().to_string());
        }
        Ok(hosts)
    }

    /// Remove expired or unreadable records. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = now_ms();
        let stale: Vec<String> = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(CREDENTIALS_TABLE)?;
            let mut stale = Vec::new();
            for item in table.iter()? {
                let (key, value) = item?;
                let keep = self
                    .cipher
                    .open::<StoredCredential>(value.value())
                    .map(|record| !record.is_expired(self.retention_ms, now))
                    .unwrap_or(false);
                if !keep {
                    stale.push(key.value().to_string());
                }
            }
            stale
        };

        if stale.is_empty() {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS_TABLE)?;
            for host in &stale {
                table.remove(host.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(stale.len())
    }

    fn remove_host(&self, host: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(CREDENTIALS_TABLE)?;
            table.remove(host)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}
