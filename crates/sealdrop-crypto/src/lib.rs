//! sealdrop-crypto: client-side envelope encryption
//!
//! Pipeline: plaintext → derive per-file key → AES-256-GCM encrypt → upload
//!
//! Key hierarchy:
//! ```text
//! Master Secret (imported once at startup, in-memory only)
//!   └── File Key (per-file, 256-bit, HKDF-SHA256)
//!         salt = 16 random bytes, fresh per encryption
//!         info = the file's original name (binds the key to that name)
//! ```
//!
//! The derived key is never stored; decryption re-derives it from the
//! master secret plus the salt recorded alongside the ciphertext metadata.

pub mod cipher;
pub mod derive;
pub mod master;

pub use cipher::{decrypt, encrypt, generate_nonce, generate_salt};
pub use derive::{derive_file_key, FileKey};
pub use master::MasterSecret;
