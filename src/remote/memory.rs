//! In-process remote store.
//!
//! Keeps rows in the same shape the hosted backend uses, enforces unique
//! ids the way a primary key would, and counts calls so tests can assert
//! which operations ran. Failures can be injected per operation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::error::{RemoteError, RemoteResult};
use super::rows::RemoteRecord;
use super::RemoteStore;
use crate::model::RecordKind;

/// Remote operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    FetchAll,
    Upsert,
    Delete,
    BulkInsert,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<RecordKind, Vec<Value>>,
    calls: HashMap<RemoteOp, usize>,
    failures: HashMap<RemoteOp, String>,
    next_id: u64,
}

/// Remote store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    state: Mutex<State>,
}

fn row_str<'a>(row: &'a Value, field: &str) -> Option<&'a str> {
    row.get(field).and_then(Value::as_str)
}

fn duplicate(id: &str) -> RemoteError {
    RemoteError::from_status(
        409,
        format!("duplicate key value violates unique constraint (id={id})"),
    )
}

impl MemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RemoteResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| RemoteError::Transport("memory remote lock poisoned".into()))
    }

    /// Count the call and return the injected failure, if any.
    fn enter(state: &mut State, op: RemoteOp) -> RemoteResult<()> {
        *state.calls.entry(op).or_default() += 1;
        match state.failures.get(&op) {
            Some(message) => Err(RemoteError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    /// Make `op` fail with a transport error until [`clear_failures`](Self::clear_failures).
    pub fn fail(&self, op: RemoteOp, message: &str) {
        if let Ok(mut state) = self.lock() {
            state.failures.insert(op, message.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut state) = self.lock() {
            state.failures.clear();
        }
    }

    /// Number of times `op` was called.
    #[must_use]
    pub fn calls(&self, op: RemoteOp) -> usize {
        self.lock()
            .map(|state| state.calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Insert records directly, bypassing counters and failures.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be encoded.
    pub fn seed<R: RemoteRecord>(&self, records: &[R], owner_id: &str) -> RemoteResult<()> {
        let mut state = self.lock()?;
        let table = state.tables.entry(R::KIND).or_default();
        for record in records {
            table.push(record.to_row(owner_id)?);
        }
        Ok(())
    }

    /// Snapshot of every stored record of kind `R`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored row cannot be decoded.
    pub fn snapshot<R: RemoteRecord>(&self) -> RemoteResult<Vec<R>> {
        let state = self.lock()?;
        state
            .tables
            .get(&R::KIND)
            .map(|rows| rows.iter().cloned().map(R::from_row).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl RemoteStore for MemoryRemoteStore {
    async fn fetch_all<R: RemoteRecord>(&self, owner_id: &str) -> RemoteResult<Vec<R>> {
        let rows = {
            let mut state = self.lock()?;
            Self::enter(&mut state, RemoteOp::FetchAll)?;
            state
                .tables
                .get(&R::KIND)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| row_str(row, "user_id") == Some(owner_id))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        let mut records = rows
            .into_iter()
            .map(R::from_row)
            .collect::<RemoteResult<Vec<_>>>()?;
        records.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(records)
    }

    async fn upsert<R: RemoteRecord>(&self, record: &R, owner_id: &str) -> RemoteResult<R> {
        let mut state = self.lock()?;
        Self::enter(&mut state, RemoteOp::Upsert)?;

        let mut stored = record.clone();
        if stored.id().is_empty() {
            state.next_id += 1;
            stored.set_id(format!("remote-{}", state.next_id));
        }
        stored.set_owner_id(Some(owner_id.to_string()));
        let row = stored.to_row(owner_id)?;

        let table = state.tables.entry(R::KIND).or_default();
        let position = table
            .iter()
            .position(|r| row_str(r, "id") == Some(stored.id()));
        match position {
            Some(i) if row_str(&table[i], "user_id") == Some(owner_id) => table[i] = row,
            Some(_) => return Err(duplicate(stored.id())),
            None => table.push(row),
        }

        Ok(stored)
    }

    async fn delete<R: RemoteRecord>(&self, id: &str, owner_id: &str) -> RemoteResult<()> {
        let mut state = self.lock()?;
        Self::enter(&mut state, RemoteOp::Delete)?;

        if let Some(table) = state.tables.get_mut(&R::KIND) {
            table.retain(|r| !(row_str(r, "id") == Some(id) && row_str(r, "user_id") == Some(owner_id)));
        }
        Ok(())
    }

    async fn bulk_insert<R: RemoteRecord>(&self, records: &[R]) -> RemoteResult<()> {
        let mut state = self.lock()?;
        Self::enter(&mut state, RemoteOp::BulkInsert)?;

        let table = state.tables.entry(R::KIND).or_default();
        let mut seen: HashSet<String> = table
            .iter()
            .filter_map(|r| row_str(r, "id").map(str::to_string))
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let owner = record.owner_id().ok_or_else(|| {
                RemoteError::from_status(400, format!("{} {} has no owner", R::KIND, record.id()))
            })?;
            if !seen.insert(record.id().to_string()) {
                return Err(duplicate(record.id()));
            }
            rows.push(record.to_row(owner)?);
        }

        table.extend(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BodyMetric, Workout};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn owned(mut metric: BodyMetric, owner: &str) -> BodyMetric {
        metric.owner_id = Some(owner.to_string());
        metric
    }

    #[tokio::test]
    async fn test_fetch_filters_by_owner_and_sorts_desc() {
        let store = MemoryRemoteStore::new();
        store
            .seed(
                &[
                    BodyMetric::new(date("2024-01-01"), 80.0).with_id("1"),
                    BodyMetric::new(date("2024-01-03"), 79.0).with_id("2"),
                ],
                "alice",
            )
            .unwrap();
        store
            .seed(&[BodyMetric::new(date("2024-01-02"), 90.0).with_id("3")], "bob")
            .unwrap();

        let records: Vec<BodyMetric> = store.fetch_all("alice").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(store.calls(RemoteOp::FetchAll), 1);
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryRemoteStore::new();
        let saved = store
            .upsert(&BodyMetric::new(date("2024-01-01"), 80.0), "alice")
            .await
            .unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.owner_id.as_deref(), Some("alice"));

        let mut edited = saved.clone();
        edited.weight = 78.5;
        store.upsert(&edited, "alice").await.unwrap();

        let all: Vec<BodyMetric> = store.snapshot().unwrap();
        assert_eq!(all.len(), 1);
        assert!((all[0].weight - 78.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_upsert_rejects_foreign_id() {
        let store = MemoryRemoteStore::new();
        store
            .seed(&[BodyMetric::new(date("2024-01-01"), 80.0).with_id("1")], "bob")
            .unwrap();

        let err = store
            .upsert(&BodyMetric::new(date("2024-01-01"), 70.0).with_id("1"), "alice")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryRemoteStore::new();
        store.delete::<Workout>("nope", "alice").await.unwrap();
        assert_eq!(store.calls(RemoteOp::Delete), 1);
    }

    #[tokio::test]
    async fn test_bulk_insert_is_all_or_nothing() {
        let store = MemoryRemoteStore::new();
        store
            .seed(&[BodyMetric::new(date("2024-01-01"), 80.0).with_id("1")], "alice")
            .unwrap();

        let batch = vec![
            owned(BodyMetric::new(date("2024-01-02"), 81.0).with_id("2"), "alice"),
            owned(BodyMetric::new(date("2024-01-03"), 82.0).with_id("1"), "alice"),
        ];
        assert!(store.bulk_insert(&batch).await.is_err());
        assert_eq!(store.snapshot::<BodyMetric>().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryRemoteStore::new();
        store.fail(RemoteOp::FetchAll, "offline");

        let err = store.fetch_all::<Workout>("alice").await.unwrap_err();
        assert_eq!(err.message(), "offline");

        store.clear_failures();
        assert!(store.fetch_all::<Workout>("alice").await.unwrap().is_empty());
    }
}
