//! AES-256-GCM file payload encryption/decryption
//!
//! Ciphertext layout: `[N bytes: ciphertext][16 bytes: GCM tag]`. The nonce
//! is NOT prepended; it travels in the file's metadata record together with
//! the derivation salt, and both must be presented again at decryption.
//!
//! GCM authentication is the sole integrity check. A rejected tag means
//! tampered data or mismatched key parameters (wrong salt, wrong name used
//! as derivation context, corrupted metadata) and is never worth retrying.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use sealdrop_core::{SealdropError, SealdropResult, NONCE_SIZE, SALT_SIZE};

use crate::derive::FileKey;

/// Generate a fresh random key-derivation salt.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Generate a fresh random cipher nonce.
///
/// Never reuse a nonce under the same key; callers get that for free by
/// deriving a fresh key per encryption (new salt) AND a fresh nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt a file payload under a derived key.
///
/// Generates the nonce internally and returns it alongside the ciphertext;
/// the caller stores it in the file's metadata record.
pub fn encrypt(key: &FileKey, plaintext: &[u8]) -> SealdropResult<(Vec<u8>, [u8; NONCE_SIZE])> {
    let nonce = generate_nonce();
    let ciphertext = encrypt_with_nonce(key, &nonce, plaintext)?;
    Ok((ciphertext, nonce))
}

/// Encrypt with a caller-generated nonce (same uniqueness contract).
pub fn encrypt_with_nonce(
    key: &FileKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> SealdropResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| SealdropError::Crypto("AES-GCM encryption failed".into()))
}

/// Decrypt a file payload.
///
/// Fails with [`SealdropError::AuthenticationFailure`] if the ciphertext was
/// tampered with or the key/nonce do not match those used at encryption.
pub fn decrypt(
    key: &FileKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> SealdropResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| SealdropError::AuthenticationFailure)
}
