//! Main database entry point for signupdb.
//!
//! This module provides the `SignupDb` struct, the primary entry point for
//! all database operations. It is an explicitly constructed object, not a
//! process-wide singleton, so tests can instantiate isolated, disposable
//! databases.

use crate::error::{Error, Result};
use crate::services::{ActivityService, JoinService};
use crate::storage::{FileBackend, MemoryBackend, StorageBackend};
use crate::store::DocumentStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The signupdb database.
///
/// # Example
///
/// ```ignore
/// use signupdb::prelude::*;
///
/// let db = SignupDb::open("./my-db")?;
///
/// let activity = db.activities.create(NewActivity { /* ... */ })?;
/// let join_id = db.joins.join_activity(NewJoin { /* ... */ })?;
/// db.joins.cancel_join(&join_id)?;
/// ```
pub struct SignupDb {
    store: Arc<DocumentStore>,

    /// Activity lifecycle operations.
    pub activities: ActivityService,

    /// Sign-up operations and `joinedCount` consistency.
    pub joins: JoinService,
}

impl SignupDb {
    /// Open a file-backed database at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an ephemeral database with no disk I/O.
    ///
    /// Creates no files, cannot recover, loses all data when dropped. Use
    /// for unit tests and temporary computations.
    pub fn ephemeral() -> Self {
        Self::from_backend(Arc::new(MemoryBackend::new()))
    }

    /// Create a builder for database configuration.
    pub fn builder() -> SignupDbBuilder {
        SignupDbBuilder::new()
    }

    /// Direct access to the document store.
    ///
    /// This is the only path to the persistence backing; collaborators go
    /// through the store's operations, never the backing itself.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn from_backend(backend: Arc<dyn StorageBackend>) -> Self {
        let store = Arc::new(DocumentStore::new(backend));
        Self {
            activities: ActivityService::new(store.clone()),
            joins: JoinService::new(store.clone()),
            store,
        }
    }
}

/// Builder for database configuration.
///
/// # Example
///
/// ```ignore
/// let db = SignupDb::builder().path("./my-db").open()?;
/// ```
#[derive(Default)]
pub struct SignupDbBuilder {
    path: Option<PathBuf>,
}

impl SignupDbBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database directory path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Open the database at the configured path.
    pub fn open(self) -> Result<SignupDb> {
        let path = self
            .path
            .ok_or_else(|| Error::Storage("no database path configured".to_string()))?;
        let backend = FileBackend::open(path)?;
        Ok(SignupDb::from_backend(Arc::new(backend)))
    }
}
