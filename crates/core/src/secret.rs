//! Credential obfuscation codec and secret providers.
//!
//! AES-256-CBC keyed by the SHA-256 digest of a passphrase, a random IV
//! prepended to the ciphertext and the whole blob base64-encoded. There is no
//! authentication tag: this only exists so already-encrypted credentials keep
//! decrypting. Prefer an authenticated scheme for anything new.

use aes::Aes256;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Padding granularity. Stored secrets were padded to 32 bytes, not to the
/// AES block size, so the pad length byte ranges over 1..=32.
const PAD_UNIT: usize = 32;

pub const PASSPHRASE_ENV: &str = "ARGOSYNC_PASSPHRASE";
pub const USERNAME_ENV: &str = "ARGOSYNC_USERNAME";
pub const PASSWORD_ENV: &str = "ARGOSYNC_PASSWORD";

#[derive(Debug, Clone, PartialEq)]
pub enum SecretError {
    Encoding(String),
    Malformed(String),
    Utf8,
    Missing(String),
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretError::Encoding(e) => write!(f, "Invalid base64: {}", e),
            SecretError::Malformed(e) => write!(f, "Malformed ciphertext: {}", e),
            SecretError::Utf8 => write!(f, "Decrypted secret is not valid UTF-8"),
            SecretError::Missing(e) => write!(f, "Missing secret: {}", e),
        }
    }
}

impl std::error::Error for SecretError {}

fn derive_key(passphrase: &str) -> [u8; 32] {
    let digest = Sha256::digest(passphrase.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

fn pad(message: &[u8]) -> Vec<u8> {
    let n = PAD_UNIT - message.len() % PAD_UNIT;
    let mut out = Vec::with_capacity(message.len() + n);
    out.extend_from_slice(message);
    out.resize(message.len() + n, n as u8);
    out
}

fn unpad(mut padded: Vec<u8>) -> Vec<u8> {
    // Corrupt input yields garbage rather than an error; callers validate.
    let n = padded.last().copied().unwrap_or(0) as usize;
    let keep = padded.len().saturating_sub(n);
    padded.truncate(keep);
    padded
}

/// Encrypt `plaintext` under `passphrase`; a fresh IV is drawn on every call.
pub fn encrypt(passphrase: &str, plaintext: &str) -> String {
    let key = derive_key(passphrase);
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new(&key.into(), &iv.into());
    let body = cipher.encrypt_padded_vec_mut::<NoPadding>(&pad(plaintext.as_bytes()));

    let mut blob = Vec::with_capacity(IV_LEN + body.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&body);
    B64.encode(blob)
}

/// Decrypt a blob produced by [`encrypt`].
pub fn decrypt(passphrase: &str, encoded: &str) -> Result<String, SecretError> {
    let blob = B64
        .decode(encoded.trim())
        .map_err(|e| SecretError::Encoding(e.to_string()))?;
    if blob.len() < IV_LEN + BLOCK_LEN || (blob.len() - IV_LEN) % BLOCK_LEN != 0 {
        return Err(SecretError::Malformed(format!("{} bytes", blob.len())));
    }
    let (iv, body) = blob.split_at(IV_LEN);

    let key = derive_key(passphrase);
    let cipher = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|e| SecretError::Malformed(e.to_string()))?;
    let padded = cipher
        .decrypt_padded_vec_mut::<NoPadding>(body)
        .map_err(|e| SecretError::Malformed(e.to_string()))?;

    String::from_utf8(unpad(padded)).map_err(|_| SecretError::Utf8)
}

// --- Providers ---

/// Clear-text login pair. Only ever held in memory.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of the login pair, consulted once per session.
pub trait SecretProvider {
    fn credentials(&self) -> Result<Credentials, SecretError>;
}

impl SecretProvider for Credentials {
    fn credentials(&self) -> Result<Credentials, SecretError> {
        Ok(self.clone())
    }
}

/// Encrypted username/password blobs plus the passphrase that opens them.
#[derive(Clone, Default, Deserialize)]
pub struct EncryptedCredentials {
    #[serde(default)]
    pub passphrase: String,
    pub username: String,
    pub password: String,
}

impl EncryptedCredentials {
    /// Read the three values from `ARGOSYNC_*` environment variables.
    pub fn from_env() -> Result<Self, SecretError> {
        let var = |name: &str| std::env::var(name).map_err(|_| SecretError::Missing(name.to_string()));
        Ok(Self {
            passphrase: var(PASSPHRASE_ENV)?,
            username: var(USERNAME_ENV)?,
            password: var(PASSWORD_ENV)?,
        })
    }

    /// Overlay environment values on top of this one, field by field.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var(PASSPHRASE_ENV) {
            self.passphrase = v;
        }
        if let Ok(v) = std::env::var(USERNAME_ENV) {
            self.username = v;
        }
        if let Ok(v) = std::env::var(PASSWORD_ENV) {
            self.password = v;
        }
        self
    }
}

impl fmt::Debug for EncryptedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SecretProvider for EncryptedCredentials {
    fn credentials(&self) -> Result<Credentials, SecretError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(SecretError::Missing("encrypted username/password".to_string()));
        }
        let username = decrypt(&self.passphrase, &self.username)?;
        let password = decrypt(&self.passphrase, &self.password)?;
        if username.trim().is_empty() {
            return Err(SecretError::Malformed("empty username".to_string()));
        }
        Ok(Credentials { username, password })
    }
}
