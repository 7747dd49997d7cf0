//! AES-256-GCM encryption of installation identifiers at rest.
//!
//! Installation identifiers are encrypted with a random nonce before being
//! persisted and decrypted transparently on read. Because the ciphertext is
//! not deterministic, a keyed SHA-256 fingerprint is stored next to it for
//! equality lookups.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::domain::errors::{DomainError, DomainResult};

const NONCE_LEN: usize = 12;

/// Symmetric cipher for installation identifiers, keyed by the
/// application secret.
#[derive(Clone)]
pub struct InstallationCipher {
    key: Key<Aes256Gcm>,
    fingerprint_key: [u8; 32],
}

impl InstallationCipher {
    /// Derive the encryption and fingerprint keys from the app secret.
    pub fn new(app_key: &str) -> Self {
        let key = *Key::<Aes256Gcm>::from_slice(&Sha256::digest(app_key.as_bytes()));

        let mut hasher = Sha256::new();
        hasher.update(b"issuegate-installation-fingerprint:");
        hasher.update(app_key.as_bytes());
        let mut fingerprint_key = [0u8; 32];
        fingerprint_key.copy_from_slice(&hasher.finalize());

        Self { key, fingerprint_key }
    }

    /// Encrypt a plaintext identifier.
    ///
    /// Returns a base64-encoded string of `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        let cipher = Aes256Gcm::new(&self.key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| DomainError::Encryption(format!("encryption failed: {e}")))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(&combined))
    }

    /// Decrypt a base64-encoded `nonce || ciphertext` string.
    pub fn decrypt(&self, encrypted: &str) -> DomainResult<String> {
        let cipher = Aes256Gcm::new(&self.key);

        let combined = base64::engine::general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| DomainError::Encryption(format!("invalid base64: {e}")))?;

        if combined.len() < NONCE_LEN {
            return Err(DomainError::Encryption("ciphertext too short (missing nonce)".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| DomainError::Encryption(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| DomainError::Encryption(format!("plaintext is not valid UTF-8: {e}")))
    }

    /// Deterministic lookup key for an identifier, hex encoded.
    pub fn fingerprint(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.fingerprint_key);
        hasher.update(plaintext.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

impl std::fmt::Debug for InstallationCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InstallationCipher { .. }")
    }
}
