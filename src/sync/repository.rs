//! Record repository: the synchronization core.
//!
//! A repository owns the canonical in-memory list for one record kind and
//! dispatches every operation on the auth state:
//!
//! - **Anonymous**: local storage is the only store.
//! - **Authenticated**: the remote store is primary and local storage
//!   mirrors it. The first load after sign-in migrates local-only records.
//!
//! Local storage is written after every successful operation so the list
//! survives an auth flip mid-session.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::reconcile::{plan_upload, reconcile};
use super::types::{AuthState, LoadOutcome, LoadState, Notice};
use crate::error::{Error, Result};
use crate::model::{Record, next_record_id};
use crate::remote::{RemoteRecord, RemoteStore};
use crate::storage::{KeyValueStore, LocalRecordStore};

/// Replace the record with the same id, or append it.
fn upsert_in<R: Record>(records: &mut Vec<R>, record: R) {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

fn sort_newest_first<R: Record>(records: &mut [R]) {
    records.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Load/save/delete for one record kind.
#[derive(Debug)]
pub struct Repository<R, L, S> {
    local: LocalRecordStore<L>,
    remote: S,
    auth: AuthState,
    state: LoadState,
    records: Vec<R>,
    /// Local-only records left behind by a failed migration.
    unsynced: Vec<R>,
}

impl<R, L, S> Repository<R, L, S>
where
    R: RemoteRecord,
    L: KeyValueStore,
    S: RemoteStore,
{
    /// Create an unloaded, anonymous repository.
    pub fn new(local: L, remote: S) -> Self {
        Self {
            local: LocalRecordStore::new(local),
            remote,
            auth: AuthState::Anonymous,
            state: LoadState::Unloaded,
            records: Vec::new(),
            unsynced: Vec::new(),
        }
    }

    /// Set the initial auth state without loading.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthState) -> Self {
        self.auth = auth;
        self
    }

    /// The canonical list.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub const fn state(&self) -> LoadState {
        self.state
    }

    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Local records still waiting for a successful migration.
    pub fn unsynced(&self) -> &[R] {
        &self.unsynced
    }

    /// Find a record in the canonical list.
    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Apply an auth change. Reloads when the state actually changed.
    pub async fn set_auth(&mut self, auth: AuthState) -> Option<LoadOutcome<R>> {
        if auth == self.auth {
            return None;
        }
        debug!(kind = %R::KIND, authenticated = auth.is_authenticated(), "Auth state changed");
        self.auth = auth;
        Some(self.load().await)
    }

    /// Load the canonical list for the current auth state.
    ///
    /// Never fails. Remote problems fall back to local data and are reported
    /// as notices.
    pub async fn load(&mut self) -> LoadOutcome<R> {
        self.state = LoadState::Loading;
        let mut notices = Vec::new();
        let mut unsynced = Vec::new();

        let records = match self.auth.clone() {
            AuthState::Anonymous => self.local.load(),
            AuthState::Authenticated { user_id } => {
                match self.remote.fetch_all::<R>(&user_id).await {
                    Ok(remote) => {
                        let (records, left) = self.migrate(remote, &user_id, &mut notices).await;
                        unsynced = left;
                        records
                    }
                    Err(e) => {
                        warn!(kind = %R::KIND, error = %e, "Remote load failed, using local data");
                        notices.push(Notice::LoadFailed {
                            kind: R::KIND,
                            message: e.message(),
                        });
                        self.local.load()
                    }
                }
            }
        };

        self.records = records;
        self.unsynced = unsynced;
        if let Err(e) = self.local.replace_all(&self.mirror_list()) {
            warn!(kind = %R::KIND, error = %e, "Failed to mirror records locally");
        }
        self.state = LoadState::Ready;
        debug!(kind = %R::KIND, count = self.records.len(), "Loaded records");

        LoadOutcome {
            records: self.records.clone(),
            notices,
        }
    }

    /// Run the migration against a fresh remote list.
    ///
    /// Returns the canonical list and the local-only records a failed upload
    /// left behind.
    async fn migrate(&self, remote: Vec<R>, user_id: &str, notices: &mut Vec<Notice>) -> (Vec<R>, Vec<R>) {
        let local: Vec<R> = self.local.load();
        if local.is_empty() {
            return (remote, Vec::new());
        }

        match reconcile(&self.remote, &local, &remote, user_id).await {
            Ok(outcome) if outcome.uploaded_count() == 0 => (remote, Vec::new()),
            Ok(outcome) => {
                let count = outcome.uploaded_count();
                notices.push(Notice::Synced { kind: R::KIND, count });

                match self.remote.fetch_all::<R>(user_id).await {
                    Ok(fresh) => (fresh, Vec::new()),
                    Err(e) => {
                        warn!(kind = %R::KIND, error = %e, "Re-fetch after migration failed");
                        let mut merged = remote;
                        merged.extend(outcome.uploaded);
                        sort_newest_first(&mut merged);
                        (merged, Vec::new())
                    }
                }
            }
            Err(e) => {
                warn!(kind = %R::KIND, error = %e, "Migration failed, keeping local records");
                notices.push(Notice::SyncFailed {
                    kind: R::KIND,
                    message: e.message(),
                });
                let left = local
                    .into_iter()
                    .filter(|r| !remote.iter().any(|existing| existing.id() == r.id()))
                    .collect();
                (remote, left)
            }
        }
    }

    /// What local storage should hold: the canonical list plus unsynced records.
    fn mirror_list(&self) -> Vec<R> {
        let mut all = self.records.clone();
        all.extend(
            self.unsynced
                .iter()
                .filter(|r| self.get(r.id()).is_none())
                .cloned(),
        );
        all
    }

    async fn ensure_loaded(&mut self) {
        if self.state == LoadState::Unloaded {
            let outcome = self.load().await;
            for notice in outcome.notices {
                warn!(kind = %R::KIND, "{notice}");
            }
        }
    }

    /// Save a record, assigning an id if it has none.
    ///
    /// # Errors
    ///
    /// Returns `Error::Remote` when the remote write fails (authenticated) or
    /// a storage error when the local write fails (anonymous). The canonical
    /// list is unchanged on failure.
    pub async fn save(&mut self, mut record: R) -> Result<R> {
        self.ensure_loaded().await;

        let now = Utc::now();
        if record.is_new() {
            record.set_id(next_record_id(&self.mirror_list(), now));
        }
        record.set_saved_at(now);

        match &self.auth {
            AuthState::Authenticated { user_id } => {
                let stored = self.remote.upsert(&record, user_id).await?;
                upsert_in(&mut self.records, stored.clone());
                self.unsynced.retain(|r| r.id() != stored.id());
                if let Err(e) = self.local.replace_all(&self.mirror_list()) {
                    warn!(kind = %R::KIND, error = %e, "Saved remotely but failed to mirror locally");
                }
                info!(kind = %R::KIND, id = stored.id(), "Saved record remotely");
                Ok(stored)
            }
            AuthState::Anonymous => {
                let mut next = self.records.clone();
                upsert_in(&mut next, record.clone());
                self.local.replace_all(&next)?;
                self.records = next;
                info!(kind = %R::KIND, id = record.id(), "Saved record locally");
                Ok(record)
            }
        }
    }

    /// Delete a record by id.
    ///
    /// Returns whether the record was in the canonical list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Remote` when the remote delete fails (authenticated)
    /// or a storage error when the local write fails (anonymous). The
    /// canonical list is unchanged on failure.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        self.ensure_loaded().await;

        let existed = self.get(id).is_some();
        let next: Vec<R> = self.records.iter().filter(|r| r.id() != id).cloned().collect();

        match &self.auth {
            AuthState::Authenticated { user_id } => {
                self.remote.delete::<R>(id, user_id).await?;
                self.records = next;
                self.unsynced.retain(|r| r.id() != id);
                if let Err(e) = self.local.replace_all(&self.mirror_list()) {
                    warn!(kind = %R::KIND, error = %e, "Deleted remotely but failed to mirror locally");
                }
            }
            AuthState::Anonymous => {
                self.local.replace_all(&next)?;
                self.records = next;
            }
        }

        debug!(kind = %R::KIND, id, existed, "Deleted record");
        Ok(existed)
    }

    /// Local records that a migration would upload right now.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAuthenticated` for anonymous sessions, or the
    /// remote error if the remote list cannot be fetched.
    pub async fn pending_upload(&self) -> Result<Vec<R>> {
        let user_id = self.auth.user_id().ok_or(Error::NotAuthenticated)?;
        let remote = self.remote.fetch_all::<R>(user_id).await?;
        Ok(plan_upload(&self.local.load(), &remote, user_id, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BodyMetric, Exercise, Workout, WorkoutSet};
    use crate::remote::{MemoryRemoteStore, RemoteOp};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use std::sync::Arc;

    type TestRepo<R> = Repository<R, Arc<MemoryStorage>, Arc<MemoryRemoteStore>>;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn squat(id: &str, day: &str) -> Workout {
        Workout::new(date(day))
            .with_id(id)
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]))
    }

    fn setup<R: RemoteRecord>() -> (TestRepo<R>, Arc<MemoryStorage>, Arc<MemoryRemoteStore>) {
        let storage = Arc::new(MemoryStorage::new());
        let remote = Arc::new(MemoryRemoteStore::new());
        let repo = Repository::new(Arc::clone(&storage), Arc::clone(&remote));
        (repo, storage, remote)
    }

    fn seed_local<R: Record>(storage: &MemoryStorage, records: &[R]) {
        storage
            .set(R::KIND.storage_key(), &serde_json::to_string(records).unwrap())
            .unwrap();
    }

    fn alice() -> AuthState {
        AuthState::for_user(Some("alice"))
    }

    #[tokio::test]
    async fn test_anonymous_save_then_load_round_trip() {
        let (mut repo, storage, remote) = setup::<Workout>();
        repo.load().await;

        let saved = repo.save(Workout::new(date("2024-01-05")).with_exercise(
            Exercise::new("Bench Press", vec![WorkoutSet::new("60", "8")]),
        ))
        .await
        .unwrap();
        assert!(!saved.id.is_empty());
        assert!(saved.saved_at.is_some());

        let mut reopened: TestRepo<Workout> = Repository::new(storage, remote);
        let outcome = reopened.load().await;
        let found = outcome.records.iter().find(|w| w.id == saved.id).unwrap();
        assert_eq!(found.date, saved.date);
        assert_eq!(found.exercises, saved.exercises);
    }

    #[tokio::test]
    async fn test_anonymous_save_replaces_by_id() {
        let (mut repo, _, _) = setup::<BodyMetric>();
        let first = repo.save(BodyMetric::new(date("2024-01-01"), 80.0)).await.unwrap();

        let mut edited = first.clone();
        edited.weight = 79.0;
        repo.save(edited).await.unwrap();

        assert_eq!(repo.records().len(), 1);
        assert!((repo.records()[0].weight - 79.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_anonymous_save_fails_on_storage_error() {
        let (mut repo, storage, _) = setup::<BodyMetric>();
        repo.load().await;
        storage.fail_writes(true);

        let result = repo.save(BodyMetric::new(date("2024-01-01"), 80.0)).await;
        assert!(result.is_err());
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_delete_fails_on_storage_error() {
        let (mut repo, storage, _) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01")]);
        repo.load().await;
        storage.fail_writes(true);

        assert!(repo.delete("1").await.is_err());
        assert_eq!(repo.records().len(), 1);
        assert_eq!(repo.records()[0].id, "1");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_local_on_remote_failure() {
        let (repo, storage, remote) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01")]);
        remote.fail(RemoteOp::FetchAll, "network down");

        let mut repo = repo.with_auth(alice());
        let outcome = repo.load().await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "1");
        assert!(matches!(
            &outcome.notices[..],
            [Notice::LoadFailed { message, .. }] if message == "network down"
        ));
        assert_eq!(repo.state(), LoadState::Ready);
    }

    #[tokio::test]
    async fn test_authenticated_load_migrates_and_refetches() {
        let (repo, storage, remote) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01")]);
        remote.seed(&[squat("2", "2024-01-02")], "alice").unwrap();

        let mut repo = repo.with_auth(alice());
        let outcome = repo.load().await;

        assert_eq!(
            outcome.notices,
            vec![Notice::Synced {
                kind: crate::model::RecordKind::Workout,
                count: 1
            }]
        );
        let ids: Vec<_> = outcome.records.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(remote.calls(RemoteOp::FetchAll), 2);

        // Mirror now matches the remote list.
        let mirrored: Vec<Workout> = serde_json::from_str(&storage.raw("workouts").unwrap()).unwrap();
        assert_eq!(mirrored.len(), 2);

        // A second load uploads nothing.
        let again = repo.load().await;
        assert!(again.notices.is_empty());
        assert_eq!(remote.calls(RemoteOp::BulkInsert), 1);
    }

    #[tokio::test]
    async fn test_failed_migration_keeps_local_records() {
        let (repo, storage, remote) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01")]);
        remote.fail(RemoteOp::BulkInsert, "constraint violation");

        let mut repo = repo.with_auth(alice());
        let outcome = repo.load().await;

        assert!(outcome.records.is_empty());
        assert!(matches!(&outcome.notices[..], [Notice::SyncFailed { .. }]));
        let local: Vec<Workout> = serde_json::from_str(&storage.raw("workouts").unwrap()).unwrap();
        assert_eq!(local.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_migration_survives_save_and_delete() {
        let (repo, storage, remote) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01"), squat("2", "2024-01-02")]);
        remote.fail(RemoteOp::BulkInsert, "constraint violation");

        let mut repo = repo.with_auth(alice());
        repo.load().await;
        assert_eq!(repo.unsynced().len(), 2);

        let saved = repo.save(squat("", "2024-01-03")).await.unwrap();
        assert!(!repo.delete("2").await.unwrap());

        let local: Vec<Workout> = serde_json::from_str(&storage.raw("workouts").unwrap()).unwrap();
        let mut ids: Vec<_> = local.iter().map(|w| w.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["1", saved.id.as_str()]);

        remote.clear_failures();
        let mut next: TestRepo<Workout> =
            Repository::new(Arc::clone(&storage), Arc::clone(&remote)).with_auth(alice());
        let outcome = next.load().await;

        assert_eq!(
            outcome.notices,
            vec![Notice::Synced {
                kind: crate::model::RecordKind::Workout,
                count: 1
            }]
        );
        assert!(outcome.records.iter().any(|w| w.id == "1"));
        assert!(next.unsynced().is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_save_then_load_round_trip() {
        let (repo, storage, remote) = setup::<Workout>();
        let mut repo = repo.with_auth(alice());
        repo.load().await;

        let saved = repo
            .save(Workout::new(date("2024-02-10")).with_exercise(Exercise::new(
                "Deadlift",
                vec![WorkoutSet::new("140", "5"), WorkoutSet::new("150", "3")],
            )))
            .await
            .unwrap();

        let mut reopened: TestRepo<Workout> =
            Repository::new(Arc::clone(&storage), Arc::clone(&remote)).with_auth(alice());
        let outcome = reopened.load().await;

        let found = outcome.records.iter().find(|w| w.id == saved.id).unwrap();
        assert_eq!(found.date, saved.date);
        assert_eq!(found.exercises, saved.exercises);
        assert!(outcome.notices.is_empty());
        assert_eq!(remote.calls(RemoteOp::BulkInsert), 0);
    }

    #[tokio::test]
    async fn test_authenticated_save_failure_leaves_list_untouched() {
        let (repo, _, remote) = setup::<BodyMetric>();
        let mut repo = repo.with_auth(alice());
        repo.load().await;
        remote.fail(RemoteOp::Upsert, "timeout");

        let err = repo.save(BodyMetric::new(date("2024-01-01"), 80.0)).await.unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_save_writes_remote_and_mirror() {
        let (repo, storage, remote) = setup::<BodyMetric>();
        let mut repo = repo.with_auth(alice());
        repo.load().await;

        let saved = repo.save(BodyMetric::new(date("2024-01-01"), 80.0)).await.unwrap();
        assert_eq!(saved.owner_id.as_deref(), Some("alice"));
        assert_eq!(remote.snapshot::<BodyMetric>().unwrap().len(), 1);

        let mirrored: Vec<BodyMetric> =
            serde_json::from_str(&storage.raw("bodyMetrics").unwrap()).unwrap();
        assert_eq!(mirrored[0].id, saved.id);
    }

    #[tokio::test]
    async fn test_authenticated_delete() {
        let (repo, _, remote) = setup::<Workout>();
        remote.seed(&[squat("1", "2024-01-01")], "alice").unwrap();
        let mut repo = repo.with_auth(alice());
        repo.load().await;

        remote.fail(RemoteOp::Delete, "offline");
        assert!(repo.delete("1").await.is_err());
        assert_eq!(repo.records().len(), 1);

        remote.clear_failures();
        assert!(repo.delete("1").await.unwrap());
        assert!(repo.records().is_empty());
        assert!(remote.snapshot::<Workout>().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_delete_unknown_id() {
        let (mut repo, storage, _) = setup::<Workout>();
        seed_local(&storage, &[squat("1", "2024-01-01")]);

        assert!(!repo.delete("9").await.unwrap());
        assert!(repo.delete("1").await.unwrap());
        assert_eq!(storage.raw("workouts").as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_auth_reloads_only_on_change() {
        let (mut repo, _, remote) = setup::<Workout>();
        remote.seed(&[squat("1", "2024-01-01")], "alice").unwrap();

        assert!(repo.set_auth(AuthState::Anonymous).await.is_none());

        let outcome = repo.set_auth(alice()).await.unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(repo.set_auth(alice()).await.is_none());
        assert_eq!(remote.calls(RemoteOp::FetchAll), 1);
    }

    #[tokio::test]
    async fn test_pending_upload_requires_auth() {
        let (repo, storage, _) = setup::<Workout>();
        assert!(matches!(repo.pending_upload().await, Err(Error::NotAuthenticated)));

        seed_local(&storage, &[squat("1", "2024-01-01")]);
        let repo = repo.with_auth(alice());
        assert_eq!(repo.pending_upload().await.unwrap().len(), 1);
    }
}
