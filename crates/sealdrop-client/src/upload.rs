//! Upload orchestrator: encrypt sequentially, transmit as one batch,
//! reconcile server-assigned names into the metadata store.
//!
//! Sequencing per file (input order, cooperative, no fan-out):
//! fresh salt → derive key → fresh nonce → encrypt → provisional record
//! (`stored_name: None`) upserted into the store. A per-file encryption
//! failure excludes that file from the batch without blocking the rest.
//!
//! The network phase is a single batched request covering every staged
//! file. On success, each staged record is resolved against the response
//! by its ORIGINAL name (not by position: the transport makes no ordering
//! promise strong enough to trust positional matching) and all confirmed
//! records are committed in one store write. On failure, nothing is
//! committed: the provisional records stay pending, retrieval refuses
//! them, and the caller prunes or retries.

use tracing::{debug, warn};

use sealdrop_core::{FileMetadata, FileStatus, SealdropError, SealdropResult, StatusEvent};
use sealdrop_crypto::cipher;
use sealdrop_store::MetadataStore;

use crate::keyring::KeyService;
use crate::transport::{StorageTransport, UploadPart};

/// Status event sink; the core emits transitions, rendering is the
/// subscriber's concern.
pub type StatusSink = Box<dyn Fn(&StatusEvent) + Send + Sync>;

/// Per-file result of a batch upload.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: FileStatus,
    /// Set only when the server confirmed the upload.
    pub stored_name: Option<String>,
}

struct StagedFile {
    /// Position in the input slice (keeps outcomes in input order).
    index: usize,
    record: FileMetadata,
    ciphertext: Vec<u8>,
}

fn emit(status: Option<&StatusSink>, file_name: &str, st: FileStatus) {
    if let Some(sink) = status {
        sink(&StatusEvent {
            file_name: file_name.to_string(),
            status: st,
        });
    }
}

/// Encrypt and upload a set of files as one batch.
///
/// Returns one outcome per input file, in input order. A batch-level
/// transport failure is returned as `Err` (surfaced once, not per file);
/// the staged records remain pending in the store for the caller to prune
/// or retry.
///
/// Fails fast with [`SealdropError::KeyNotReady`] if the key service was
/// never initialized; that is an ordering bug, not a per-file condition.
pub async fn upload_batch(
    keys: &KeyService,
    store: &mut MetadataStore,
    transport: &dyn StorageTransport,
    files: &[(String, Vec<u8>)],
    status: Option<&StatusSink>,
) -> SealdropResult<Vec<FileOutcome>> {
    let mut outcomes: Vec<Option<FileOutcome>> = (0..files.len()).map(|_| None).collect();
    let mut staged: Vec<StagedFile> = Vec::new();

    for (index, (file_name, plaintext)) in files.iter().enumerate() {
        match stage_file(keys, file_name, plaintext) {
            Ok((record, ciphertext)) => {
                store.upsert(record.clone())?;
                emit(status, file_name, FileStatus::Pending);
                staged.push(StagedFile {
                    index,
                    record,
                    ciphertext,
                });
            }
            Err(SealdropError::KeyNotReady) => return Err(SealdropError::KeyNotReady),
            Err(e) => {
                warn!(file = %file_name, error = %e, "encryption failed, excluding from batch");
                emit(status, file_name, FileStatus::EncryptionFailed);
                outcomes[index] = Some(FileOutcome {
                    file_name: file_name.clone(),
                    status: FileStatus::EncryptionFailed,
                    stored_name: None,
                });
            }
        }
    }

    if staged.is_empty() {
        return Ok(outcomes.into_iter().flatten().collect());
    }

    let parts: Vec<UploadPart> = staged
        .iter()
        .map(|s| UploadPart {
            file_name: s.record.file_name.clone(),
            ciphertext: s.ciphertext.clone(),
        })
        .collect();

    let response = match transport.upload_batch(parts).await {
        Ok(response) => response,
        Err(e) => {
            for s in &staged {
                emit(status, &s.record.file_name, FileStatus::UploadFailed);
            }
            return Err(e);
        }
    };

    // Resolve stored names by original file name. Per-name queues keep
    // submission order when one batch carries the same name twice.
    let mut assigned: std::collections::HashMap<&str, std::collections::VecDeque<&str>> =
        std::collections::HashMap::new();
    for entry in &response.files {
        assigned
            .entry(entry.original.as_str())
            .or_default()
            .push_back(entry.stored.as_str());
    }

    let mut confirmed: Vec<FileMetadata> = Vec::with_capacity(staged.len());
    for s in &staged {
        let stored = assigned
            .get_mut(s.record.file_name.as_str())
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| {
                SealdropError::Transport(format!(
                    "server response missing an entry for \"{}\"",
                    s.record.file_name
                ))
            })?;
        let mut record = s.record.clone();
        record.stored_name = Some(stored.to_string());
        confirmed.push(record);
    }

    // All-or-nothing: one store write covers the whole confirmed batch.
    store.commit_batch(confirmed.clone())?;

    for (s, record) in staged.iter().zip(&confirmed) {
        debug!(
            file = %record.file_name,
            stored = %record.stored_name.as_deref().unwrap_or_default(),
            "upload confirmed"
        );
        emit(status, &record.file_name, FileStatus::Uploaded);
        outcomes[s.index] = Some(FileOutcome {
            file_name: record.file_name.clone(),
            status: FileStatus::Uploaded,
            stored_name: record.stored_name.clone(),
        });
    }

    Ok(outcomes.into_iter().flatten().collect())
}

/// Derive, encrypt, and build the provisional record for one file.
fn stage_file(
    keys: &KeyService,
    file_name: &str,
    plaintext: &[u8],
) -> SealdropResult<(FileMetadata, Vec<u8>)> {
    if file_name.is_empty() {
        // The name is both the metadata primary key and the key-derivation
        // context; an empty one can satisfy neither.
        return Err(SealdropError::Crypto("file name must not be empty".into()));
    }

    let salt = cipher::generate_salt();
    let key = keys.derive_file_key(file_name, &salt)?;
    let (ciphertext, nonce) = cipher::encrypt(&key, plaintext)?;

    Ok((
        FileMetadata {
            file_name: file_name.to_string(),
            salt,
            nonce,
            stored_name: None,
        },
        ciphertext,
    ))
}
