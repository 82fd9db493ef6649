//! Durable state storage
//!
//! A single key-value entry holds the serialized `CyclesState`. The
//! [`KeyValueStore`] trait is the storage boundary; the controller persists
//! through it after every mutation and rehydrates from it at startup.

pub mod controller;
pub mod file;
pub mod memory;
pub mod persist;

use anyhow::Result;

pub use controller::CyclesController;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use persist::{revive_state, serialize_state, storage_key, SCHEMA_VERSION};

/// A local key-value store holding string values
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if there is none
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. No-op if it is absent.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
