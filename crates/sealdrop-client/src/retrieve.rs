//! Retrieval and removal flows
//!
//! Retrieval re-derives the per-file key from the stored salt and decrypts
//! with the stored nonce; no randomness is ever re-generated on this
//! path. A record whose upload was never confirmed (`stored_name` unset)
//! is treated the same as a missing record: there is nothing addressable
//! on the server.
//!
//! Removal deletes the local record first (local state is authoritative
//! for the user-visible file list), then makes a best-effort remote
//! delete. A remote failure is reported but never resurrects the local
//! record; the resulting orphaned remote object is a cleanup concern, not
//! a correctness one.

use tracing::{debug, warn};

use sealdrop_core::{SealdropError, SealdropResult};
use sealdrop_crypto::cipher;
use sealdrop_store::MetadataStore;

use crate::keyring::KeyService;
use crate::transport::StorageTransport;

/// Fetch and decrypt a file by its original name.
///
/// Errors are distinct by cause: [`SealdropError::MetadataMissing`] for
/// lost or incomplete local bookkeeping, [`SealdropError::RemoteNotFound`]
/// when the server has no such object, and
/// [`SealdropError::AuthenticationFailure`] for a corrupted or tampered
/// ciphertext, never conflated with not-found.
pub async fn download_file(
    keys: &KeyService,
    store: &MetadataStore,
    transport: &dyn StorageTransport,
    file_name: &str,
) -> SealdropResult<Vec<u8>> {
    let meta = store
        .find(file_name)
        .ok_or_else(|| SealdropError::MetadataMissing {
            file_name: file_name.to_string(),
        })?;
    let stored_name = meta
        .stored_name
        .as_deref()
        .ok_or_else(|| SealdropError::MetadataMissing {
            file_name: file_name.to_string(),
        })?;

    debug!(file = %file_name, stored = %stored_name, "fetching ciphertext");
    let ciphertext = transport.download(stored_name).await?;

    let key = keys.derive_file_key(&meta.file_name, &meta.salt)?;
    cipher::decrypt(&key, &meta.nonce, &ciphertext)
}

/// Result of a removal: the local record is always gone on `Ok`; the
/// remote side is best-effort.
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub file_name: String,
    /// Server confirmed the delete. False when the record was still
    /// pending (nothing remote to delete) or the remote call failed.
    pub remote_deleted: bool,
    /// Failure detail when the remote delete did not succeed.
    pub remote_error: Option<String>,
}

/// Remove a file: local metadata first, then best-effort remote delete.
pub async fn remove_file(
    store: &mut MetadataStore,
    transport: &dyn StorageTransport,
    file_name: &str,
) -> SealdropResult<RemovalOutcome> {
    let stored_name = match store.find(file_name) {
        Some(meta) => meta.stored_name.clone(),
        None => {
            return Err(SealdropError::MetadataMissing {
                file_name: file_name.to_string(),
            })
        }
    };

    store.remove(file_name)?;

    let Some(stored_name) = stored_name else {
        // Never confirmed by the server; nothing remote to address.
        return Ok(RemovalOutcome {
            file_name: file_name.to_string(),
            remote_deleted: false,
            remote_error: None,
        });
    };

    match transport.delete(&stored_name).await {
        Ok(message) => {
            debug!(file = %file_name, stored = %stored_name, message = %message, "remote delete confirmed");
            Ok(RemovalOutcome {
                file_name: file_name.to_string(),
                remote_deleted: true,
                remote_error: None,
            })
        }
        Err(e) => {
            warn!(
                file = %file_name,
                stored = %stored_name,
                error = %e,
                "remote delete failed; local record already removed"
            );
            Ok(RemovalOutcome {
                file_name: file_name.to_string(),
                remote_deleted: false,
                remote_error: Some(e.to_string()),
            })
        }
    }
}
