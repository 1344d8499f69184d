//! Durable key-value storage for proximity records.
//!
//! The core only needs `get`, `set` and `remove` over a handful of fixed
//! keys. Backends:
//! - [`InMemoryKeyValueStore`] for tests and single-process embedding
//! - [`FileKeyValueStore`] (feature `persistent`) for sharing records
//!   between processes

mod memory;
mod traits;

#[cfg(feature = "persistent")]
pub mod persistent;

pub use memory::InMemoryKeyValueStore;
pub use traits::{KeyValueStore, StorageError};

#[cfg(feature = "persistent")]
pub use persistent::{open_store, FileKeyValueStore, FileStoreConfig};
