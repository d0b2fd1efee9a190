//! Local persistence for FitTrack.
//!
//! Record collections live in a durable key-value store, one JSON array per
//! collection key. The store is injected as a [`KeyValueStore`] so the sync
//! layer can run against SQLite in the CLI and an in-memory double in tests.
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite-backed key-value store
//! - [`memory`] - In-memory key-value store with failure injection
//! - [`local`] - Typed record collections on top of a key-value store

pub mod local;
pub mod memory;
pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use crate::error::Result;

pub use local::LocalRecordStore;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Synchronous key-value storage port.
///
/// Values are opaque strings; a `set` either fully replaces the value or
/// leaves the previous one in place.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
