use serde::{Deserialize, Serialize};

use crate::{NONCE_SIZE, SALT_SIZE};

/// Local record tying an original file name to its cryptographic parameters
/// and the identifier the server stored the ciphertext under.
///
/// `file_name` is the primary key: at most one active record per name, and a
/// re-upload of the same name supersedes the old record entirely (old salt,
/// nonce, and stored name are discarded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original, human-meaningful name chosen by the user.
    pub file_name: String,
    /// Key-derivation salt, fresh per encryption.
    #[serde(with = "b64_array")]
    pub salt: [u8; SALT_SIZE],
    /// Cipher nonce, fresh per encryption.
    #[serde(with = "b64_array")]
    pub nonce: [u8; NONCE_SIZE],
    /// Server-assigned identifier. `None` while an upload is in flight;
    /// once set, it is the only name used to address the object remotely.
    pub stored_name: Option<String>,
}

impl FileMetadata {
    /// A record without a stored name is an in-flight (or abandoned) upload
    /// and must never be used for retrieval or removal against the server.
    pub fn is_pending(&self) -> bool {
        self.stored_name.is_none()
    }
}

/// Per-file status transition surfaced to whatever UI layer subscribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// Encrypted and staged, waiting for server acknowledgment.
    Pending,
    /// Server confirmed the upload and assigned a stored name.
    Uploaded,
    /// Encryption failed for this file; it was excluded from the batch.
    EncryptionFailed,
    /// The batched request failed; no stored name was assigned.
    UploadFailed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Pending => write!(f, "Pending"),
            FileStatus::Uploaded => write!(f, "Uploaded"),
            FileStatus::EncryptionFailed => write!(f, "encryption failed"),
            FileStatus::UploadFailed => write!(f, "upload failed"),
        }
    }
}

/// A status transition event. The core emits these; rendering belongs to
/// the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub file_name: String,
    pub status: FileStatus,
}

/// Serde helper: fixed-size byte arrays as base64 strings in JSON.
mod b64_array {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(de: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(de)?;
        let raw = STANDARD
            .decode(&s)
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))?;
        raw.try_into()
            .map_err(|v: Vec<u8>| serde::de::Error::custom(format!("expected {N} bytes, got {}", v.len())))
    }
}
