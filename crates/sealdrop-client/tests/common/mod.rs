//! Shared test fixtures: an in-memory storage server fake and helpers.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sealdrop_client::{
    BatchUploadResponse, KeyService, StatusSink, StorageTransport, StoredEntry, UploadPart,
};
use sealdrop_core::{SealdropError, SealdropResult, StatusEvent};
use sealdrop_crypto::MasterSecret;
use sealdrop_store::MetadataStore;
use tempfile::TempDir;

/// In-memory stand-in for the storage server. Mirrors its collision
/// behavior: an upload whose name is already taken is stored under
/// `name(1)`, `name(2)`, ... with the extension preserved.
#[derive(Default)]
pub struct MemoryTransport {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn object(&self, stored_name: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(stored_name).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Simulate server-side data loss.
    pub fn drop_object(&self, stored_name: &str) {
        self.objects.lock().unwrap().remove(stored_name);
    }

    /// Simulate server-side corruption by flipping one ciphertext bit.
    pub fn corrupt_object(&self, stored_name: &str) {
        let mut objects = self.objects.lock().unwrap();
        let blob = objects.get_mut(stored_name).expect("object to corrupt");
        blob[0] ^= 0x01;
    }
}

fn unique_stored_name(existing: &BTreeMap<String, Vec<u8>>, original: &str) -> String {
    if !existing.contains_key(original) {
        return original.to_string();
    }
    let (stem, ext) = match original.rfind('.') {
        Some(i) if i > 0 => original.split_at(i),
        _ => (original, ""),
    };
    let mut counter = 1;
    loop {
        let candidate = format!("{stem}({counter}){ext}");
        if !existing.contains_key(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[async_trait]
impl StorageTransport for MemoryTransport {
    async fn upload_batch(&self, parts: Vec<UploadPart>) -> SealdropResult<BatchUploadResponse> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(SealdropError::Transport("injected upload failure".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        let mut files = Vec::new();
        for part in parts {
            let stored = unique_stored_name(&objects, &part.file_name);
            objects.insert(stored.clone(), part.ciphertext);
            files.push(StoredEntry {
                original: part.file_name,
                stored,
            });
        }
        Ok(BatchUploadResponse {
            message: "Files uploaded successfully!".into(),
            files,
        })
    }

    async fn download(&self, stored_name: &str) -> SealdropResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(stored_name)
            .cloned()
            .ok_or_else(|| SealdropError::RemoteNotFound {
                stored_name: stored_name.to_string(),
            })
    }

    async fn delete(&self, stored_name: &str) -> SealdropResult<String> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(SealdropError::Transport("injected delete failure".into()));
        }
        match self.objects.lock().unwrap().remove(stored_name) {
            Some(_) => Ok("File deleted successfully".into()),
            None => Err(SealdropError::RemoteNotFound {
                stored_name: stored_name.to_string(),
            }),
        }
    }
}

pub async fn ready_key_service() -> KeyService {
    let keys = KeyService::new();
    keys.init_with(|| async { MasterSecret::from_bytes(b"integration-test-secret".to_vec()) })
        .await
        .expect("key import");
    keys
}

pub fn temp_store() -> (TempDir, MetadataStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = MetadataStore::open(&dir.path().join("metadata.json"));
    (dir, store)
}

/// A status sink that records every event for later assertions.
pub fn recording_sink() -> (StatusSink, Arc<Mutex<Vec<StatusEvent>>>) {
    let events: Arc<Mutex<Vec<StatusEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let handle = events.clone();
    let sink: StatusSink = Box::new(move |event: &StatusEvent| {
        handle.lock().unwrap().push(event.clone());
    });
    (sink, events)
}
