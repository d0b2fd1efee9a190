//! Tracker facade.
//!
//! Bundles the workout and body-metric repositories behind the operations
//! the command layer uses, and feeds their canonical lists to the metrics
//! engine on demand.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::metrics::{self, ProgressReport, TimeRange};
use crate::model::{BodyMetric, Workout};
use crate::remote::RemoteStore;
use crate::storage::KeyValueStore;
use crate::sync::{AuthState, LoadState, Notice, Repository};

/// Both record lists after a load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub workouts: Vec<Workout>,
    pub body_metrics: Vec<BodyMetric>,
    pub loading: bool,
    pub notices: Vec<Notice>,
}

/// Local records a migration would upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpload {
    pub workouts: Vec<Workout>,
    pub body_metrics: Vec<BodyMetric>,
}

/// Workouts and body metrics for one session.
#[derive(Debug)]
pub struct Tracker<L, S> {
    workouts: Repository<Workout, L, S>,
    body_metrics: Repository<BodyMetric, L, S>,
}

impl<L, S> Tracker<L, S>
where
    L: KeyValueStore + Clone,
    S: RemoteStore + Clone,
{
    pub fn new(local: L, remote: S) -> Self {
        Self {
            workouts: Repository::new(local.clone(), remote.clone()),
            body_metrics: Repository::new(local, remote),
        }
    }

    /// Set the initial auth state without loading.
    #[must_use]
    pub fn with_auth(self, auth: AuthState) -> Self {
        Self {
            workouts: self.workouts.with_auth(auth.clone()),
            body_metrics: self.body_metrics.with_auth(auth),
        }
    }

    pub fn auth(&self) -> &AuthState {
        self.workouts.auth()
    }

    /// True while either list is being loaded.
    pub fn is_loading(&self) -> bool {
        self.workouts.state() == LoadState::Loading || self.body_metrics.state() == LoadState::Loading
    }

    pub fn workouts(&self) -> &[Workout] {
        self.workouts.records()
    }

    pub fn body_metrics(&self) -> &[BodyMetric] {
        self.body_metrics.records()
    }

    /// Load both lists. Never fails; problems come back as notices.
    pub async fn load_all(&mut self) -> Snapshot {
        let workouts = self.workouts.load().await;
        let body_metrics = self.body_metrics.load().await;

        let mut notices = workouts.notices;
        notices.extend(body_metrics.notices);

        Snapshot {
            workouts: workouts.records,
            body_metrics: body_metrics.records,
            loading: self.is_loading(),
            notices,
        }
    }

    /// Apply an auth change to both lists, reloading on change.
    pub async fn set_auth(&mut self, auth: AuthState) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(outcome) = self.workouts.set_auth(auth.clone()).await {
            notices.extend(outcome.notices);
        }
        if let Some(outcome) = self.body_metrics.set_auth(auth).await {
            notices.extend(outcome.notices);
        }
        notices
    }

    /// Save a workout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if no exercise has a name, otherwise
    /// any repository save error.
    pub async fn save_workout(&mut self, workout: Workout) -> Result<Workout> {
        if !workout.has_named_exercise() {
            return Err(Error::InvalidArgument(
                "A workout needs at least one exercise with a name".to_string(),
            ));
        }
        self.workouts.save(workout).await
    }

    /// Save a body-weight measurement.
    ///
    /// # Errors
    ///
    /// Returns any repository save error.
    pub async fn save_body_metric(&mut self, metric: BodyMetric) -> Result<BodyMetric> {
        self.body_metrics.save(metric).await
    }

    /// Delete a workout. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns any repository delete error.
    pub async fn delete_workout(&mut self, id: &str) -> Result<bool> {
        self.workouts.delete(id).await
    }

    /// Delete a body-weight measurement. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns any repository delete error.
    pub async fn delete_body_metric(&mut self, id: &str) -> Result<bool> {
        self.body_metrics.delete(id).await
    }

    /// Derived metrics over the current lists.
    pub fn compute_metrics(
        &self,
        range: TimeRange,
        selected_exercise: Option<&str>,
        today: NaiveDate,
    ) -> ProgressReport {
        metrics::compute(
            self.workouts(),
            self.body_metrics(),
            range,
            selected_exercise,
            today,
        )
    }

    /// Local records not yet present remotely.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAuthenticated` for anonymous sessions or the
    /// remote error if the remote lists cannot be fetched.
    pub async fn pending_upload(&self) -> Result<PendingUpload> {
        Ok(PendingUpload {
            workouts: self.workouts.pending_upload().await?,
            body_metrics: self.body_metrics.pending_upload().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, WorkoutSet};
    use crate::remote::{MemoryRemoteStore, RemoteOp};
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tracker() -> (
        Tracker<Arc<MemoryStorage>, Arc<MemoryRemoteStore>>,
        Arc<MemoryStorage>,
        Arc<MemoryRemoteStore>,
    ) {
        let storage = Arc::new(MemoryStorage::new());
        let remote = Arc::new(MemoryRemoteStore::new());
        (Tracker::new(Arc::clone(&storage), Arc::clone(&remote)), storage, remote)
    }

    #[tokio::test]
    async fn test_save_requires_named_exercise() {
        let (mut tracker, _, _) = tracker();
        tracker.load_all().await;

        let unnamed = Workout::new(date("2024-01-01"))
            .with_exercise(Exercise::new("", vec![WorkoutSet::new("100", "5")]))
            .with_exercise(Exercise::new("  ", vec![]));
        assert!(matches!(
            tracker.save_workout(unnamed).await,
            Err(Error::InvalidArgument(_))
        ));

        // A blank first entry is fine when a later one is named.
        let named = Workout::new(date("2024-01-01"))
            .with_exercise(Exercise::new("", vec![]))
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]));
        tracker.save_workout(named).await.unwrap();
        assert_eq!(tracker.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_metrics_follow_saves() {
        let (mut tracker, _, _) = tracker();
        tracker.load_all().await;

        let today = date("2024-03-10");
        tracker
            .save_workout(
                Workout::new(today)
                    .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")])),
            )
            .await
            .unwrap();
        tracker.save_body_metric(BodyMetric::new(today, 80.0)).await.unwrap();

        let report = tracker.compute_metrics(TimeRange::Week, Some("squat"), today);
        assert_eq!(report.summary.total_workouts, 1);
        assert_eq!(report.summary.current_streak, 1);
        assert_eq!(report.exercise_series.len(), 1);
        assert_eq!(report.weight_series.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_migrates_both_kinds() {
        let (mut tracker, _, remote) = tracker();
        tracker.load_all().await;
        tracker
            .save_workout(
                Workout::new(date("2024-01-01"))
                    .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")])),
            )
            .await
            .unwrap();
        tracker.save_body_metric(BodyMetric::new(date("2024-01-01"), 80.0)).await.unwrap();

        let notices = tracker.set_auth(AuthState::for_user(Some("alice"))).await;
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| !n.is_error()));
        assert_eq!(remote.calls(RemoteOp::BulkInsert), 2);
        assert_eq!(tracker.workouts()[0].owner_id.as_deref(), Some("alice"));

        let pending = tracker.pending_upload().await.unwrap();
        assert!(pending.workouts.is_empty());
        assert!(pending.body_metrics.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_recovers_from_remote_failure() {
        let (tracker, _, remote) = tracker();
        remote.fail(RemoteOp::FetchAll, "offline");
        let mut tracker = tracker.with_auth(AuthState::for_user(Some("alice")));

        let snapshot = tracker.load_all().await;
        assert!(!snapshot.loading);
        assert!(!tracker.is_loading());
        assert_eq!(snapshot.notices.len(), 2);
        assert!(snapshot.notices.iter().all(Notice::is_error));
    }
}
