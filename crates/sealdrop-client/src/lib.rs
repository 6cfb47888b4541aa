//! sealdrop-client: the client-side orchestration layer
//!
//! Ties the pieces together: [`keyring::KeyService`] holds the imported
//! master secret behind a memoized readiness cell, [`upload`] runs the
//! encrypt-then-batch-upload sequence and reconciles server-assigned names
//! back into the metadata store, [`retrieve`] handles download/decrypt and
//! removal. The storage server itself sits behind
//! [`transport::StorageTransport`] so everything above it can be exercised
//! against an in-memory fake.

pub mod keyring;
pub mod retrieve;
pub mod transport;
pub mod upload;

pub use keyring::KeyService;
pub use retrieve::{download_file, remove_file, RemovalOutcome};
pub use transport::{BatchUploadResponse, HttpTransport, StorageTransport, StoredEntry, UploadPart};
pub use upload::{upload_batch, FileOutcome, StatusSink};
