pub mod config;
pub mod error;
pub mod types;

pub use error::{SealdropError, SealdropResult};
pub use types::{FileMetadata, FileStatus, StatusEvent};

/// Size of a derived per-file key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the key-derivation salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM nonce in bytes (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;
