//! Mapping between records and backend table rows.
//!
//! Rows use the backend's column names (`savedat`, `user_id`). The
//! `exercises` column is text, so the structured list is serialized to a
//! JSON string on write and accepted either as text or as an array on read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{RemoteError, RemoteResult};
use crate::model::{BodyMetric, Exercise, Record, Workout};

/// A record that can be stored as a row in the hosted backend.
pub trait RemoteRecord: Record {
    /// Build the row for `owner_id`. An empty id is omitted so the backend
    /// can assign one.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Decode` if a nested field cannot be encoded.
    fn to_row(&self, owner_id: &str) -> RemoteResult<Value>;

    /// Decode a row returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Decode` if the row is malformed.
    fn from_row(row: Value) -> RemoteResult<Self>;
}

/// Ids may come back as text or as numbers depending on the column type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl From<RowId> for String {
    fn from(id: RowId) -> Self {
        match id {
            RowId::Text(s) => s,
            RowId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExercisesColumn {
    List(Vec<Exercise>),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeightColumn {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct WorkoutRow {
    id: RowId,
    date: NaiveDate,
    #[serde(default)]
    savedat: Option<DateTime<Utc>>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    exercises: Option<ExercisesColumn>,
}

#[derive(Debug, Deserialize)]
struct BodyMetricRow {
    id: RowId,
    date: NaiveDate,
    #[serde(default)]
    savedat: Option<DateTime<Utc>>,
    #[serde(default)]
    user_id: Option<String>,
    weight: WeightColumn,
}

fn base_row<R: Record>(record: &R, owner_id: &str) -> Map<String, Value> {
    let mut row = Map::new();
    if !record.id().is_empty() {
        row.insert("id".into(), Value::String(record.id().to_string()));
    }
    row.insert("date".into(), Value::String(record.date().format("%Y-%m-%d").to_string()));
    row.insert(
        "savedat".into(),
        record
            .saved_at()
            .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
    );
    row.insert("user_id".into(), Value::String(owner_id.to_string()));
    row
}

impl RemoteRecord for Workout {
    fn to_row(&self, owner_id: &str) -> RemoteResult<Value> {
        let mut row = base_row(self, owner_id);
        let exercises = serde_json::to_string(&self.exercises)?;
        row.insert("exercises".into(), Value::String(exercises));
        Ok(Value::Object(row))
    }

    fn from_row(row: Value) -> RemoteResult<Self> {
        let row: WorkoutRow = serde_json::from_value(row)?;
        let exercises = match row.exercises {
            None => Vec::new(),
            Some(ExercisesColumn::List(list)) => list,
            Some(ExercisesColumn::Text(text)) if text.trim().is_empty() => Vec::new(),
            Some(ExercisesColumn::Text(text)) => serde_json::from_str(&text)?,
        };
        Ok(Self {
            id: row.id.into(),
            date: row.date,
            saved_at: row.savedat,
            exercises,
            owner_id: row.user_id,
        })
    }
}

impl RemoteRecord for BodyMetric {
    fn to_row(&self, owner_id: &str) -> RemoteResult<Value> {
        let mut row = base_row(self, owner_id);
        let weight = serde_json::Number::from_f64(self.weight)
            .ok_or_else(|| RemoteError::Decode(format!("weight is not finite: {}", self.weight)))?;
        row.insert("weight".into(), Value::Number(weight));
        Ok(Value::Object(row))
    }

    fn from_row(row: Value) -> RemoteResult<Self> {
        let row: BodyMetricRow = serde_json::from_value(row)?;
        let weight = match row.weight {
            WeightColumn::Number(n) => n,
            WeightColumn::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| RemoteError::Decode(format!("invalid weight: {text}")))?,
        };
        Ok(Self {
            id: row.id.into(),
            date: row.date,
            saved_at: row.savedat,
            weight,
            owner_id: row.user_id,
        })
    }
}
