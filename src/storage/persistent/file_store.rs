//! One-file-per-key store with atomic replace.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::storage::traits::{KeyValueStore, StorageError};

use super::codec;
use super::FileStoreConfig;

const RECORD_EXT: &str = "rec";

/// Key-value store keeping each record in its own checksummed file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    cfg: FileStoreConfig,
    tmp_counter: AtomicU64,
}

impl FileKeyValueStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created, or `BackendError`
    /// if `dir` exists and is not a directory.
    pub fn open(dir: &Path, cfg: FileStoreConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        if !dir.is_dir() {
            return Err(StorageError::BackendError(format!(
                "store path is not a directory: {}",
                dir.display()
            )));
        }

        debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir: dir.to_path_buf(),
            cfg,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Directory holding the record files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{RECORD_EXT}")))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".{key}.{}.{n}.tmp", std::process::id()))
    }
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn replace_record(tmp: &Path, path: &Path, frame: &[u8], sync: bool) -> std::io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(frame)?;
    if sync {
        file.sync_all()?;
    }
    fs::rename(tmp, path)
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.record_path(key)?;
        let frame = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        codec::decode(&frame, self.cfg.max_record_size)
            .map(Some)
            .map_err(|reason| StorageError::Corrupted {
                key: key.to_string(),
                reason,
            })
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        if value.len() > self.cfg.max_record_size {
            return Err(StorageError::BackendError(format!(
                "record '{key}' of {} bytes exceeds maximum {}",
                value.len(),
                self.cfg.max_record_size
            )));
        }

        let frame = codec::encode(value).map_err(StorageError::SerializationError)?;
        let tmp = self.tmp_path(key);

        if let Err(e) = replace_record(&tmp, &path, &frame, self.cfg.sync_on_write) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp record");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let paths = keys
            .iter()
            .map(|key| self.record_path(key))
            .collect::<Result<Vec<_>, _>>()?;

        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn open(dir: &Path) -> FileKeyValueStore {
        FileKeyValueStore::open(dir, FileStoreConfig::default()).unwrap()
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());

        assert_eq!(store.get("proximity_state").unwrap(), None);
        store.set("proximity_state", b"{}").unwrap();
        assert_eq!(store.get("proximity_state").unwrap().as_deref(), Some(&b"{}"[..]));

        store.remove(&["proximity_state", "never_written"]).unwrap();
        assert_eq!(store.get("proximity_state").unwrap(), None);
    }

    #[test]
    fn test_visible_to_second_handle() {
        let dir = tempdir().unwrap();
        let writer = open(dir.path());
        let reader = open(dir.path());

        writer.set("k", b"first").unwrap();
        writer.set("k", b"second").unwrap();
        assert_eq!(reader.get("k").unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.set("a", b"1").unwrap();
        store.set("a", b"2").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.rec".to_string()]);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());

        for key in ["", "../escape", "a/b", "with space"] {
            assert!(matches!(store.set(key, b"x"), Err(StorageError::InvalidKey(_))));
        }
    }

    #[test]
    fn test_corrupted_record_reported() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.set("k", b"payload").unwrap();

        let path = dir.path().join("k.rec");
        let mut bytes = fs::read(&path).unwrap();
        bytes[6] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(store.get("k"), Err(StorageError::Corrupted { .. })));
    }

    #[test]
    fn test_rejects_oversized_value() {
        let dir = tempdir().unwrap();
        let cfg = FileStoreConfig {
            sync_on_write: false,
            max_record_size: 256,
        };
        let store = FileKeyValueStore::open(dir.path(), cfg).unwrap();

        assert!(store.set("k", &[b'x'; 257]).is_err());
        assert!(store.set("k", &[b'x'; 256]).is_ok());
    }
}
