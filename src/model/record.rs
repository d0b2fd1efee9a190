//! Shared record contract for persisted collections.
//!
//! Workouts and body metrics share the same lifecycle: created with an
//! empty id, assigned a time-based id on first save, replaced by id on
//! later saves and removed by id on delete. The [`Record`] trait captures
//! that lifecycle so storage, remote and sync code stay generic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Workout,
    BodyMetric,
}

impl RecordKind {
    /// Key of the collection in local key-value storage.
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::Workout => "workouts",
            Self::BodyMetric => "bodyMetrics",
        }
    }

    /// Table name in the remote backend.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Workout => "workouts",
            Self::BodyMetric => "body_metrics",
        }
    }

    /// Human-readable plural label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Workout => "workouts",
            Self::BodyMetric => "body metrics",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workout => write!(f, "workout"),
            Self::BodyMetric => write!(f, "body_metric"),
        }
    }
}

/// A persisted record with identity, a logical date and sync metadata.
pub trait Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which collection this record belongs to.
    const KIND: RecordKind;

    /// Opaque identifier; empty means "not yet persisted".
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Calendar day the record describes.
    fn date(&self) -> NaiveDate;

    fn saved_at(&self) -> Option<DateTime<Utc>>;

    fn set_saved_at(&mut self, saved_at: DateTime<Utc>);

    /// Owning account, present only on remote-backed records.
    fn owner_id(&self) -> Option<&str>;

    fn set_owner_id(&mut self, owner_id: Option<String>);

    /// True when the record has never been saved.
    fn is_new(&self) -> bool {
        self.id().is_empty()
    }
}

/// Generate a time-based record id that does not collide with `existing`.
///
/// Ids are the current Unix time in milliseconds; on collision the value is
/// bumped until it is free.
#[must_use]
pub fn next_record_id<R: Record>(existing: &[R], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|r| r.id() == id) {
            return id;
        }
        candidate += 1;
    }
}
