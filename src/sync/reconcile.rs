//! One-way migration of local records into the remote store.
//!
//! Identity is the record id: a local record is uploaded only when no
//! remote record carries the same id, so running the migration again after
//! a successful upload uploads nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::info;

use super::types::ReconcileOutcome;
use crate::model::Record;
use crate::remote::{RemoteRecord, RemoteResult, RemoteStore};

/// Select the local records missing from `remote`, stamped for upload.
///
/// Each selected record gets `owner_id` and, if it has none, `saved_at = now`.
#[must_use]
pub fn plan_upload<R: Record>(
    local: &[R],
    remote: &[R],
    owner_id: &str,
    now: DateTime<Utc>,
) -> Vec<R> {
    let remote_ids: HashSet<&str> = remote.iter().map(|r| r.id()).collect();

    local
        .iter()
        .filter(|r| !remote_ids.contains(r.id()))
        .cloned()
        .map(|mut r| {
            r.set_owner_id(Some(owner_id.to_string()));
            if r.saved_at().is_none() {
                r.set_saved_at(now);
            }
            r
        })
        .collect()
}

/// Upload local records absent remotely in a single bulk insert.
///
/// Does not touch local storage. Makes no remote call when nothing needs
/// uploading.
///
/// # Errors
///
/// Returns the `RemoteError` from the bulk insert; nothing is uploaded then.
pub async fn reconcile<R, S>(
    store: &S,
    local: &[R],
    remote: &[R],
    owner_id: &str,
) -> RemoteResult<ReconcileOutcome<R>>
where
    R: RemoteRecord,
    S: RemoteStore,
{
    let uploaded = plan_upload(local, remote, owner_id, Utc::now());
    if uploaded.is_empty() {
        return Ok(ReconcileOutcome { uploaded });
    }

    store.bulk_insert(&uploaded).await?;
    info!(kind = %R::KIND, count = uploaded.len(), "Migrated local records to remote");
    Ok(ReconcileOutcome { uploaded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, Workout, WorkoutSet};
    use crate::remote::{MemoryRemoteStore, RemoteOp};
    use chrono::NaiveDate;

    fn workout(id: &str, date: &str) -> Workout {
        Workout::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
            .with_id(id)
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]))
    }

    #[test]
    fn test_plan_upload_stamps_owner_and_saved_at() {
        let now = Utc::now();
        let mut kept = workout("2", "2024-01-02");
        let earlier = now - chrono::Duration::days(3);
        kept.saved_at = Some(earlier);

        let plan = plan_upload(&[workout("1", "2024-01-01"), kept], &[], "alice", now);
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|w| w.owner_id.as_deref() == Some("alice")));
        assert_eq!(plan[0].saved_at, Some(now));
        assert_eq!(plan[1].saved_at, Some(earlier));
    }

    #[tokio::test]
    async fn test_uploads_exactly_missing_local_record() {
        let store = MemoryRemoteStore::new();
        let local = vec![workout("1", "2024-01-01")];

        let outcome = reconcile(&store, &local, &[], "alice").await.unwrap();
        assert_eq!(outcome.uploaded_count(), 1);

        let remote: Vec<Workout> = store.snapshot().unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].id, "1");
        assert_eq!(remote[0].exercises, local[0].exercises);
        assert_eq!(remote[0].owner_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_second_run_uploads_nothing() {
        let store = MemoryRemoteStore::new();
        let local = vec![workout("1", "2024-01-01"), workout("2", "2024-01-02")];
        let remote = vec![workout("2", "2024-01-02")];

        let first = reconcile(&store, &local, &remote, "alice").await.unwrap();
        assert_eq!(first.uploaded_count(), 1);

        let mut union = remote.clone();
        union.extend(first.uploaded);
        let second = reconcile(&store, &local, &union, "alice").await.unwrap();
        assert_eq!(second.uploaded_count(), 0);
        assert_eq!(store.calls(RemoteOp::BulkInsert), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_skips_remote() {
        let store = MemoryRemoteStore::new();
        let outcome = reconcile::<Workout, _>(&store, &[], &[], "alice").await.unwrap();
        assert_eq!(outcome.uploaded_count(), 0);
        assert_eq!(store.calls(RemoteOp::BulkInsert), 0);
    }

    #[tokio::test]
    async fn test_bulk_failure_propagates() {
        let store = MemoryRemoteStore::new();
        store.fail(RemoteOp::BulkInsert, "constraint violation");

        let result = reconcile(&store, &[workout("1", "2024-01-01")], &[], "alice").await;
        assert!(result.is_err());
        assert!(store.snapshot::<Workout>().unwrap().is_empty());
    }
}
