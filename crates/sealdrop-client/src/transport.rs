//! Storage-server transport: the HTTP boundary
//!
//! The server is dumb storage: it never sees plaintext or keys, only
//! opaque ciphertext blobs. It may rename an uploaded object to avoid
//! collisions; the stored name in its response is the only identifier the
//! client may use to address the object afterwards.
//!
//! Surface:
//!   POST   {endpoint}/upload            multipart, field "files" per blob
//!   GET    {endpoint}/download/{name}   raw ciphertext bytes, 404 if absent
//!   DELETE {endpoint}/delete/{name}     404 if absent
//!
//! The trait exists so the orchestration layer can be tested against an
//! in-memory fake. No retry policy lives here: transport failures are
//! surfaced once per request and retrying is the caller's decision.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use sealdrop_core::{SealdropError, SealdropResult};

/// One ciphertext blob queued for the batched upload.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Original (plaintext) file name; the server may store under another.
    pub file_name: String,
    pub ciphertext: Vec<u8>,
}

/// Server acknowledgment for a batched upload, in submission order.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub files: Vec<StoredEntry>,
}

/// One uploaded object: the name the client sent and the name the server
/// actually stored it under.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredEntry {
    pub original: String,
    pub stored: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DeleteResponse {
    message: String,
}

#[async_trait]
pub trait StorageTransport: Send + Sync {
    /// Upload all parts in one batched request.
    async fn upload_batch(&self, parts: Vec<UploadPart>) -> SealdropResult<BatchUploadResponse>;

    /// Fetch raw ciphertext bytes by stored name.
    async fn download(&self, stored_name: &str) -> SealdropResult<Vec<u8>>;

    /// Delete the remote object; returns the server's confirmation message.
    async fn delete(&self, stored_name: &str) -> SealdropResult<String>;
}

/// reqwest-backed transport against the storage server.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, request_timeout: Duration) -> SealdropResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SealdropError::Transport(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageTransport for HttpTransport {
    async fn upload_batch(&self, parts: Vec<UploadPart>) -> SealdropResult<BatchUploadResponse> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            let blob = reqwest::multipart::Part::bytes(part.ciphertext)
                .file_name(part.file_name.clone())
                .mime_str("application/octet-stream")
                .map_err(|e| SealdropError::Transport(format!("building multipart part: {e}")))?;
            form = form.part("files", blob);
        }

        let url = format!("{}/upload", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SealdropError::Transport(format!("upload request: {e}")))?;

        if !resp.status().is_success() {
            return Err(SealdropError::Transport(format!(
                "upload failed with status {}",
                resp.status()
            )));
        }

        resp.json::<BatchUploadResponse>()
            .await
            .map_err(|e| SealdropError::Transport(format!("parsing upload response: {e}")))
    }

    async fn download(&self, stored_name: &str) -> SealdropResult<Vec<u8>> {
        let url = format!(
            "{}/download/{}",
            self.endpoint,
            urlencoding::encode(stored_name)
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SealdropError::Transport(format!("download request: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SealdropError::RemoteNotFound {
                stored_name: stored_name.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(SealdropError::Transport(format!(
                "download failed with status {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SealdropError::Transport(format!("reading download body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, stored_name: &str) -> SealdropResult<String> {
        let url = format!(
            "{}/delete/{}",
            self.endpoint,
            urlencoding::encode(stored_name)
        );
        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| SealdropError::Transport(format!("delete request: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SealdropError::RemoteNotFound {
                stored_name: stored_name.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(SealdropError::Transport(format!(
                "delete failed with status {}",
                resp.status()
            )));
        }

        let body = resp
            .json::<DeleteResponse>()
            .await
            .map_err(|e| SealdropError::Transport(format!("parsing delete response: {e}")))?;
        Ok(body.message)
    }
}
