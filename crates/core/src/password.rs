//! Password hashing
//!
//! Passwords are stored as PBKDF2-HMAC-SHA256 digests. Salt and digest are
//! both base64 strings and live on the user record next to each other; the
//! functions here are pure and take every input explicitly.
//!
//! Every operation has a synchronous form and an `_async` form that runs the
//! key derivation on the tokio blocking pool.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Default derived key length in bytes
pub const DEFAULT_KEY_LEN: usize = 64;

/// Default salt length in bytes
pub const DEFAULT_SALT_LEN: usize = 16;

/// Key derivation parameters
///
/// Persisted in `galaxy.toml` under the `[password]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// PBKDF2 iteration count
    pub iterations: u32,
    /// Derived key length in bytes
    pub key_len: usize,
    /// Salt length in bytes
    pub salt_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams {
            iterations: DEFAULT_ITERATIONS,
            key_len: DEFAULT_KEY_LEN,
            salt_len: DEFAULT_SALT_LEN,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests
    pub fn fast() -> Self {
        KdfParams {
            iterations: 10,
            key_len: 32,
            salt_len: 8,
        }
    }

    /// Generate a salt of `salt_len` bytes
    pub fn new_salt(&self) -> String {
        new_salt(self.salt_len)
    }
}

/// Base64 of `byte_len` random bytes
pub fn new_salt(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Derive the base64 digest of `password` with a base64 `salt`
pub fn hash(password: &str, salt: &str, params: &KdfParams) -> Result<String> {
    if password.is_empty() {
        return Err(Error::Credential("password is empty".to_string()));
    }
    let salt = STANDARD
        .decode(salt)
        .map_err(|e| Error::Credential(format!("salt is not base64: {}", e)))?;
    if salt.is_empty() {
        return Err(Error::Credential("salt is empty".to_string()));
    }
    if params.iterations == 0 || params.key_len == 0 {
        return Err(Error::Credential(
            "iterations and key length must be positive".to_string(),
        ));
    }

    let mut key = vec![0u8; params.key_len];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, params.iterations, &mut key);
    Ok(STANDARD.encode(key))
}

/// [`hash`] on the blocking pool
pub async fn hash_async(password: String, salt: String, params: KdfParams) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(&password, &salt, &params))
        .await
        .map_err(|e| Error::Credential(format!("hashing task failed: {}", e)))?
}

/// Check `password` against a stored digest
///
/// Malformed salts and digests simply fail to verify.
pub fn verify(password: &str, salt: &str, digest: &str, params: &KdfParams) -> bool {
    match hash(password, salt, params) {
        Ok(candidate) => constant_time_eq(candidate.as_bytes(), digest.as_bytes()),
        Err(_) => false,
    }
}

/// [`verify`] on the blocking pool
pub async fn verify_async(
    password: String,
    salt: String,
    digest: String,
    params: KdfParams,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(&password, &salt, &digest, &params))
        .await
        .map_err(|e| Error::Credential(format!("verification task failed: {}", e)))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
