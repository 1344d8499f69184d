//! File-backed storage for sharing records between processes.
//!
//! Each key maps to one file in the store directory. Writes go to a
//! temporary file that is renamed over the record, so a reader in another
//! process observes either the previous record or the new one, never a mix.
//!
//! ```text
//! <dir>/
//!   proximity_config.rec   [frame: version | len | JSON | crc32]
//!   proximity_state.rec
//! ```
//!
//! There is no locking. Concurrent writers to one key resolve as
//! last-writer-wins.

mod codec;
mod file_store;

pub use file_store::FileKeyValueStore;

use std::path::Path;

use crate::error::ZoneError;
use crate::storage::StorageError;

/// Configuration for the file backend.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Whether to fsync each record before it replaces the old one.
    pub sync_on_write: bool,
    /// Largest payload accepted on write or read (bytes).
    pub max_record_size: usize,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            sync_on_write: true,
            max_record_size: 64 * 1024, // 64 KiB
        }
    }
}

impl FileStoreConfig {
    const MIN_RECORD_SIZE: usize = 256;

    /// Rejects a record limit too small for a proximity config.
    ///
    /// # Errors
    ///
    /// Returns a storage error naming the offending value.
    pub fn validate(self) -> Result<Self, ZoneError> {
        if self.max_record_size < Self::MIN_RECORD_SIZE {
            return Err(ZoneError::Storage(StorageError::BackendError(format!(
                "max_record_size must be at least {} bytes (got {})",
                Self::MIN_RECORD_SIZE,
                self.max_record_size
            ))));
        }
        Ok(self)
    }
}

/// Open or create a file-backed store in `path`.
///
/// # Errors
/// - If the config is invalid
/// - If the directory cannot be created
/// - If `path` exists but is not a directory
///
/// # Example
/// ```rust,no_run
/// use zonewatch::storage::open_store;
/// use zonewatch::ProximityStore;
///
/// let store = ProximityStore::new(open_store("./zonewatch-data", None)?);
/// let config = store.load_config()?;
/// # Ok::<(), zonewatch::ZoneError>(())
/// ```
pub fn open_store(
    path: impl AsRef<Path>,
    config: Option<FileStoreConfig>,
) -> Result<FileKeyValueStore, ZoneError> {
    let cfg = config.unwrap_or_default().validate()?;
    FileKeyValueStore::open(path.as_ref(), cfg).map_err(ZoneError::from)
}
