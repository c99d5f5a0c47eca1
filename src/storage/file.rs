//! File-per-key backing.
//!
//! Each key lives in its own file under the database directory. Writes go
//! through a temp file followed by a rename, so a crash mid-write never
//! leaves a torn collection file behind: readers see either the old bytes
//! or the new bytes.

use super::StorageBackend;
use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Disk-backed key-value backing, one `<key>.json` file per key.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a backing directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened file backend");
        Ok(Self { dir })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are store-generated (`collection_<name>`), never user paths.
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("read {key}: {e}"))),
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| Error::Storage(format!("write {key}: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Storage(format!("commit {key}: {e}")))?;
        debug!(key, len = bytes.len(), "stored collection file");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("delete {key}: {e}"))),
        }
    }
}
