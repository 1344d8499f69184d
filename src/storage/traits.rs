//! The key-value contract shared by all storage backends.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters the backend cannot store.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A stored record failed its integrity check.
    #[error("Corrupted record '{key}': {reason}")]
    Corrupted {
        /// Key of the damaged record.
        key: String,
        /// What the check found.
        reason: String,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable key-value storage.
///
/// A completed `set` must be visible to a later `get` from any other holder
/// of the same backing store. No ordering or atomicity is promised across
/// keys, except that `remove` drops every listed key before returning.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value for `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Removes every listed key. Missing keys are ignored.
    fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove(keys)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_key_value_store_object_safe(_: &dyn KeyValueStore) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::BackendError("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = StorageError::Corrupted {
            key: "proximity_state".to_string(),
            reason: "CRC mismatch".to_string(),
        };
        assert!(err.to_string().contains("proximity_state"));
        assert!(err.to_string().contains("CRC mismatch"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
