//! Key service: process-scoped master secret with a memoized readiness cell
//!
//! The master secret is imported exactly once. Concurrent callers of
//! [`KeyService::init_with`] all await the same initialization future; the
//! import is never re-triggered once it has succeeded. Derivation before
//! import fails with [`SealdropError::KeyNotReady`], an ordering bug in
//! the caller, not a recoverable condition.

use tokio::sync::OnceCell;

use sealdrop_core::{SealdropError, SealdropResult, SALT_SIZE};
use sealdrop_crypto::{derive_file_key, FileKey, MasterSecret};

#[derive(Default)]
pub struct KeyService {
    master: OnceCell<MasterSecret>,
}

impl KeyService {
    pub fn new() -> Self {
        Self {
            master: OnceCell::new(),
        }
    }

    /// Import the master secret through `import`, memoized: the first call
    /// runs the future, later and concurrent calls await the same result.
    /// A failed import leaves the cell empty so a retry can run.
    pub async fn init_with<F, Fut>(&self, import: F) -> SealdropResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = SealdropResult<MasterSecret>>,
    {
        self.master.get_or_try_init(import).await?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.master.initialized()
    }

    /// Derive the per-file key for `(file_name, salt)`.
    ///
    /// Deterministic: identical inputs against the same master secret yield
    /// the identical key, so decryption re-derives rather than stores keys.
    pub fn derive_file_key(&self, file_name: &str, salt: &[u8; SALT_SIZE]) -> SealdropResult<FileKey> {
        let master = self.master.get().ok_or(SealdropError::KeyNotReady)?;
        derive_file_key(master, file_name, salt)
    }
}
