//! Per-file key derivation via HKDF-SHA256
//!
//! Extract-then-expand over the master secret, with the caller-supplied
//! 16-byte salt and the file's original name as the info string. Identical
//! `(master, salt, name)` inputs always yield the identical key, which is
//! what allows later decryption without ever persisting the key itself.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use sealdrop_core::{SealdropError, SealdropResult, KEY_SIZE, SALT_SIZE};

use crate::master::MasterSecret;

/// A derived per-file 256-bit encryption key. Zeroized on drop.
#[derive(Clone)]
pub struct FileKey {
    bytes: [u8; KEY_SIZE],
}

impl FileKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for FileKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the encryption key for one file.
///
/// The salt must be freshly random per encryption (see
/// [`crate::cipher::generate_salt`]); it is stored alongside the ciphertext
/// metadata and re-supplied at decryption time.
pub fn derive_file_key(
    master: &MasterSecret,
    file_name: &str,
    salt: &[u8; SALT_SIZE],
) -> SealdropResult<FileKey> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), master.as_bytes());
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(file_name.as_bytes(), &mut okm)
        .map_err(|e| SealdropError::Crypto(format!("HKDF expand failed: {e}")))?;
    Ok(FileKey::from_bytes(okm))
}
