//! Body-weight measurement model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordKind};

/// A body-weight measurement for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetric {
    #[serde(default)]
    pub id: String,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    /// Kilograms.
    pub weight: f64,

    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl BodyMetric {
    /// Create an unsaved measurement.
    #[must_use]
    pub fn new(date: NaiveDate, weight: f64) -> Self {
        Self {
            id: String::new(),
            date,
            saved_at: None,
            weight,
            owner_id: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
}

impl Record for BodyMetric {
    const KIND: RecordKind = RecordKind::BodyMetric;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    fn set_saved_at(&mut self, saved_at: DateTime<Utc>) {
        self.saved_at = Some(saved_at);
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn set_owner_id(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id;
    }
}
