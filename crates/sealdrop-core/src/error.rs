use thiserror::Error;

pub type SealdropResult<T> = Result<T, SealdropError>;

/// Error taxonomy for the client.
///
/// Retry semantics: `Transport` is retryable by the caller (never retried
/// here); `AuthenticationFailure` is not: it means corrupted data or
/// mismatched key parameters, not a transient fault.
#[derive(Debug, Error)]
pub enum SealdropError {
    /// Key derivation was requested before the master secret was imported.
    /// An ordering bug in the caller, not a user-facing condition.
    #[error("key service not initialized: import the master secret first")]
    KeyNotReady,

    /// AEAD rejected the ciphertext: tampered data, or salt/nonce/name that
    /// do not match the ones used at encryption time.
    #[error("ciphertext rejected: corrupted or tampered data, or mismatched key parameters")]
    AuthenticationFailure,

    /// No usable local record for this file: never uploaded, upload never
    /// confirmed, or the local store was cleared.
    #[error("no local metadata for \"{file_name}\": file was never uploaded or bookkeeping was lost")]
    MetadataMissing { file_name: String },

    /// The server has no object under this stored name.
    #[error("remote object \"{stored_name}\" not found on server")]
    RemoteNotFound { stored_name: String },

    /// Network or server failure covering the whole request.
    #[error("transport error: {0}")]
    Transport(String),

    /// Metadata snapshot could not be written or read.
    #[error("metadata store error: {0}")]
    Store(String),

    /// Master secret bytes were empty or undecodable.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Encryption-side failure (distinct from authentication rejection).
    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
