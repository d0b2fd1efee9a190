//! Hosted record store.
//!
//! The backend is a table-per-collection store keyed by owner. Everything
//! the sync layer needs goes through [`RemoteStore`]:
//!
//! - [`rest`] - PostgREST-style HTTP client (production)
//! - [`memory`] - In-process store for tests and offline runs
//! - [`rows`] - Record/row mapping

pub mod error;
pub mod memory;
pub mod rest;
pub mod rows;

use std::future::Future;
use std::sync::Arc;

pub use error::{RemoteError, RemoteResult};
pub use memory::{MemoryRemoteStore, RemoteOp};
pub use rest::{RemoteSettings, RestRemoteStore};
pub use rows::RemoteRecord;

/// Per-owner CRUD against the hosted store.
///
/// All operations are asynchronous; none of them retry.
pub trait RemoteStore: Send + Sync {
    /// Fetch every record of kind `R` owned by `owner_id`, newest date first.
    fn fetch_all<R: RemoteRecord>(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<Vec<R>>> + Send;

    /// Insert `record` when its id is empty or unknown, otherwise update the
    /// row matched by id and owner. Returns the stored record.
    fn upsert<R: RemoteRecord>(
        &self,
        record: &R,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<R>> + Send;

    /// Delete the record matched by id and owner. No match is not an error.
    fn delete<R: RemoteRecord>(
        &self,
        id: &str,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<()>> + Send;

    /// Insert all records or none. Each record carries its owner.
    fn bulk_insert<R: RemoteRecord>(
        &self,
        records: &[R],
    ) -> impl Future<Output = RemoteResult<()>> + Send;
}

impl<T: RemoteStore> RemoteStore for Arc<T> {
    fn fetch_all<R: RemoteRecord>(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<Vec<R>>> + Send {
        (**self).fetch_all(owner_id)
    }

    fn upsert<R: RemoteRecord>(
        &self,
        record: &R,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<R>> + Send {
        (**self).upsert(record, owner_id)
    }

    fn delete<R: RemoteRecord>(
        &self,
        id: &str,
        owner_id: &str,
    ) -> impl Future<Output = RemoteResult<()>> + Send {
        (**self).delete::<R>(id, owner_id)
    }

    fn bulk_insert<R: RemoteRecord>(
        &self,
        records: &[R],
    ) -> impl Future<Output = RemoteResult<()>> + Send {
        (**self).bulk_insert(records)
    }
}
