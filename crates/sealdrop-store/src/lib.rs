//! Durable local metadata store: maps original file names to their
//! cryptographic parameters and server-assigned stored names.
//!
//! The store is the exclusive owner of the record collection; other
//! components go through its interface, never the persisted file.
//!
//! Persistence model: the full record list is re-serialized to a single
//! JSON snapshot on every mutation, written via temp+rename so readers
//! never observe a torn file. There is no write-ahead log; a crash between
//! the temp write and the rename loses at most the in-flight mutation, but
//! the snapshot-per-mutation design means the store is only suitable for
//! the small record counts of an interactive client.
//!
//! A missing or malformed snapshot loads as an empty store, never an error:
//! losing local bookkeeping is recoverable (re-upload), a startup crash
//! loop is not.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sealdrop_core::{FileMetadata, SealdropError, SealdropResult};

pub struct MetadataStore {
    /// Snapshot path on disk
    path: PathBuf,
    /// In-memory map: original file name → metadata record
    entries: BTreeMap<String, FileMetadata>,
}

impl MetadataStore {
    /// Load the store from `path`, or start empty if the snapshot is
    /// missing or unreadable.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<FileMetadata>>(&content) {
                Ok(records) => records
                    .into_iter()
                    .map(|r| (r.file_name.clone(), r))
                    .collect(),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "malformed metadata snapshot, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        MetadataStore {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Look up the record for an original file name.
    pub fn find(&self, file_name: &str) -> Option<&FileMetadata> {
        self.entries.get(file_name)
    }

    /// Insert or replace the record for a file name, then persist.
    ///
    /// Replacing discards the previous salt, nonce, and stored name; the
    /// superseded remote object is orphaned unless the caller deletes it.
    pub fn upsert(&mut self, record: FileMetadata) -> SealdropResult<()> {
        self.entries.insert(record.file_name.clone(), record);
        self.persist()
    }

    /// Upsert a set of records and persist once, so no reader can observe
    /// a half-updated batch.
    pub fn commit_batch(&mut self, records: Vec<FileMetadata>) -> SealdropResult<()> {
        for record in records {
            self.entries.insert(record.file_name.clone(), record);
        }
        self.persist()
    }

    /// Remove a record, then persist. Returns whether a record existed.
    pub fn remove(&mut self, file_name: &str) -> SealdropResult<bool> {
        let existed = self.entries.remove(file_name).is_some();
        if existed {
            self.persist()?;
        }
        Ok(existed)
    }

    /// All records, ordered by file name.
    pub fn list(&self) -> Vec<&FileMetadata> {
        self.entries.values().collect()
    }

    /// Drop records whose upload was never confirmed (`stored_name` unset).
    /// Returns the number pruned. Invoked by the caller after a failed
    /// batch, never automatically.
    pub fn prune_pending(&mut self) -> SealdropResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, record| !record.is_pending());
        let pruned = before - self.entries.len();
        if pruned > 0 {
            self.persist()?;
        }
        Ok(pruned)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the full snapshot via temp+rename.
    fn persist(&self) -> SealdropResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SealdropError::Store(format!("creating store dir {}: {e}", parent.display()))
                })?;
            }
        }

        let records: Vec<&FileMetadata> = self.entries.values().collect();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| SealdropError::Store(format!("serializing snapshot: {e}")))?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| {
            SealdropError::Store(format!("writing snapshot temp {}: {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            SealdropError::Store(format!("renaming snapshot {}: {e}", self.path.display()))
        })?;

        Ok(())
    }
}
