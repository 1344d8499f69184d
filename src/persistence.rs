//! Durable proximity records shared by the execution contexts.
//!
//! Two records live under fixed keys:
//!
//! | key                | value             | absent means      |
//! |--------------------|-------------------|-------------------|
//! | `proximity_config` | `ProximityConfig` | no active target  |
//! | `proximity_state`  | `ProximityState`  | initial state     |
//!
//! Both are stored as JSON. The foreground session and the background task
//! each reconstruct the detector from these records on every invocation and
//! write the state back after every classification. Writes are
//! last-writer-wins; there is no versioning.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ProximityConfig;
use crate::detector::ProximityState;
use crate::storage::{KeyValueStore, StorageError};

/// Key of the config record.
pub const CONFIG_KEY: &str = "proximity_config";

/// Key of the detector state record.
pub const STATE_KEY: &str = "proximity_state";

/// Typed access to the proximity records of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct ProximityStore<S> {
    kv: S,
}

impl<S: KeyValueStore> ProximityStore<S> {
    /// Wraps a key-value backend.
    pub const fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &S {
        &self.kv
    }

    /// Writes the active config.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or `SerializationError`.
    pub fn save_config(&self, config: &ProximityConfig) -> Result<(), StorageError> {
        self.write(CONFIG_KEY, config)
    }

    /// Reads the active config. `None` means no target is being monitored.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or `SerializationError` for a record
    /// that does not decode.
    pub fn load_config(&self) -> Result<Option<ProximityConfig>, StorageError> {
        self.read(CONFIG_KEY)
    }

    /// Writes a detector snapshot.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or `SerializationError`.
    pub fn save_state(&self, state: &ProximityState) -> Result<(), StorageError> {
        self.write(STATE_KEY, state)
    }

    /// Reads the last detector snapshot. `None` is the initial state.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or `SerializationError` for a record
    /// that does not decode or breaks the state invariant.
    pub fn load_state(&self) -> Result<Option<ProximityState>, StorageError> {
        self.read(STATE_KEY)
    }

    /// Like [`load_state`](Self::load_state) with absence mapped to the
    /// initial state.
    ///
    /// # Errors
    ///
    /// Same as `load_state`.
    pub fn load_state_or_initial(&self) -> Result<ProximityState, StorageError> {
        Ok(self.load_state()?.unwrap_or_default())
    }

    /// Removes both records, ending the monitoring session.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub fn clear(&self) -> Result<(), StorageError> {
        debug!("clearing proximity records");
        self.kv.remove(&[CONFIG_KEY, STATE_KEY])
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::SerializationError(format!("{key}: {e}")))?;
        self.kv.set(key, &bytes)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(bytes) = self.kv.get(key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::SerializationError(format!("{key}: {e}")))
    }
}
