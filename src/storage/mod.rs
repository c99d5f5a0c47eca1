//! Flat key-value persistence backing for the document store.
//!
//! The store persists one key per collection (`collection_<name>`), each
//! holding the serialized array of that collection's documents. Backends
//! only move opaque bytes; serialization lives in the store.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// A flat key-value backing.
///
/// Every write must be durably visible to subsequent reads within the same
/// process before the call returns; backends do not buffer writes across
/// operations.
pub trait StorageBackend: Send + Sync {
    /// Read the bytes stored under `key`, or `None` if the key is absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Durably store `bytes` under `key`, replacing any previous value.
    fn store(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove `key`. No-op if absent.
    fn delete(&self, key: &str) -> Result<()>;
}
