use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

const NONCE_SIZE: usize = 12;

/// SHA-256 of a passphrase, used as a 32-byte AES key.
pub(crate) fn derive_key(passphrase: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    key.copy_from_slice(Sha256::digest(passphrase.as_bytes()).as_slice());
    key
}

/// AES-256-GCM cipher for credential records.
///
/// Output layout is `nonce || ciphertext`, a fresh random nonce per record.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    pub fn new(master_key: &[u8]) -> Result<Self> {
        if master_key.len() != 32 {
            return Err(anyhow::anyhow!(
                "Master key must be 32 bytes, got {}",
                master_key.len()
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(master_key)
            .map_err(|err| anyhow::anyhow!("Invalid master key length: {:?}", err))?;

        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let mut ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|err| anyhow::anyhow!("Failed to encrypt credential record: {:?}", err))?;
        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.append(&mut ciphertext);
        Ok(output)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE {
            return Err(anyhow::anyhow!("Ciphertext is too short"));
        }

        let (nonce_bytes, payload) = ciphertext.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher
            .decrypt(nonce, payload)
            .map_err(|err| anyhow::anyhow!("Failed to decrypt credential record: {:?}", err))
    }

    /// Serialize a record to JSON and encrypt it.
    pub fn seal<T: Serialize>(&self, record: &T) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(record).context("Failed to serialize record")?;
        self.encrypt(&json)
    }

    /// Decrypt a sealed record and deserialize it.
    pub fn open<T: DeserializeOwned>(&self, sealed: &[u8]) -> Result<T> {
        let json = self.decrypt(sealed)?;
        serde_json::from_slice(&json).context("Failed to deserialize record")
    }
}
