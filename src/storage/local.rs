//! Typed record collections over a key-value store.
//!
//! Pure serialization: each collection is a JSON array under the key given
//! by [`RecordKind::storage_key`](crate::model::RecordKind::storage_key).

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::Record;
use crate::storage::KeyValueStore;

const EMPTY_COLLECTION: &str = "[]";

/// Local adapter for record collections.
#[derive(Debug, Clone)]
pub struct LocalRecordStore<S> {
    store: S,
}

impl<S: KeyValueStore> LocalRecordStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying key-value store.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Load the collection for `R`.
    ///
    /// Never fails: an absent, unreadable or corrupt collection yields an
    /// empty list and the key is reset to an empty array.
    pub fn load<R: Record>(&self) -> Vec<R> {
        let key = R::KIND.storage_key();

        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Local collection absent, initializing");
                self.reset(key);
                return Vec::new();
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read local collection");
                self.reset(key);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key, error = %e, "Corrupt local collection, resetting");
                self.reset(key);
                Vec::new()
            }
        }
    }

    /// Overwrite the collection for `R` with `records`.
    ///
    /// A serialization failure is logged and swallowed (nothing is written).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub fn replace_all<R: Record>(&self, records: &[R]) -> Result<()> {
        let key = R::KIND.storage_key();
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize local collection");
                return Ok(());
            }
        };
        self.store.set(key, &json)?;
        debug!(key, count = records.len(), "Local collection written");
        Ok(())
    }

    fn reset(&self, key: &str) {
        if let Err(e) = self.store.set(key, EMPTY_COLLECTION) {
            warn!(key, error = %e, "Failed to reset local collection");
        }
    }
}
