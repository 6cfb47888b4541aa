//! Master secret handle: the single long-lived key-derivation input

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use sealdrop_core::{SealdropError, SealdropResult};

/// The master secret all per-file keys are derived from.
///
/// Held only in process memory, never serialized, zeroized on drop.
/// Length is the caller's choice (a passphrase or raw key bytes); empty
/// input is rejected.
pub struct MasterSecret {
    bytes: Vec<u8>,
}

impl MasterSecret {
    pub fn from_bytes(bytes: Vec<u8>) -> SealdropResult<Self> {
        if bytes.is_empty() {
            return Err(SealdropError::InvalidKeyMaterial(
                "master secret must not be empty".into(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Import a secret string, using its UTF-8 bytes as the derivation input.
    pub fn from_passphrase(passphrase: &SecretString) -> SealdropResult<Self> {
        Self::from_bytes(passphrase.expose_secret().as_bytes().to_vec())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_rejected() {
        let result = MasterSecret::from_bytes(Vec::new());
        assert!(matches!(result, Err(SealdropError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn passphrase_import_uses_utf8_bytes() {
        let secret = MasterSecret::from_passphrase(&SecretString::from("hunter2")).unwrap();
        assert_eq!(secret.as_bytes(), b"hunter2");
    }

    #[test]
    fn debug_redacts_bytes() {
        let secret = MasterSecret::from_bytes(vec![1, 2, 3]).unwrap();
        let printed = format!("{secret:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("[1, 2, 3]"));
    }
}
