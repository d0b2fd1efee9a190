//! Workout model.
//!
//! A workout is a dated list of exercises, each with ordered sets. Weight
//! and reps stay string-encoded because they come straight from free-text
//! input; the metrics engine parses them once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordKind};

/// One set of an exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Weight as entered (kilograms), e.g. `"100"` or `"62.5"`.
    #[serde(default)]
    pub weight: String,
    /// Repetitions as entered.
    #[serde(default)]
    pub reps: String,
}

impl WorkoutSet {
    pub fn new(weight: impl Into<String>, reps: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            reps: reps.into(),
        }
    }
}

/// A named exercise with its sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: Vec<WorkoutSet>) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Empty until first save.
    #[serde(default)]
    pub id: String,

    /// Logical day of the workout.
    pub date: NaiveDate,

    /// Set on every save; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub exercises: Vec<Exercise>,

    /// Present only on remote-backed records.
    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Workout {
    /// Create an unsaved workout for `date`.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            date,
            saved_at: None,
            exercises: Vec::new(),
            owner_id: None,
        }
    }

    /// Append an exercise.
    #[must_use]
    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    /// Set the id explicitly (editing an existing workout).
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// True when at least one exercise carries a non-blank name.
    ///
    /// A workout failing this check has nothing worth saving.
    #[must_use]
    pub fn has_named_exercise(&self) -> bool {
        self.exercises.iter().any(|e| !e.name.trim().is_empty())
    }

    /// Total number of sets across all exercises.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

impl Record for Workout {
    const KIND: RecordKind = RecordKind::Workout;

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

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_has_named_exercise_checks_whole_list() {
        let workout = Workout::new(day(1))
            .with_exercise(Exercise::new("", vec![WorkoutSet::default()]))
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]));
        assert!(workout.has_named_exercise());

        let blank = Workout::new(day(1)).with_exercise(Exercise::new("   ", vec![]));
        assert!(!blank.has_named_exercise());
        assert!(!Workout::new(day(1)).has_named_exercise());
    }

    #[test]
    fn test_local_json_shape() {
        let workout = Workout::new(day(2))
            .with_id("1")
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]));

        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "date": "2024-01-02",
                "exercises": [{"name": "Squat", "sets": [{"weight": "100", "reps": "5"}]}]
            })
        );
    }

    #[test]
    fn test_reads_legacy_user_id_field() {
        let json = r#"{"id":"9","date":"2024-01-03","savedAt":"2024-01-03T10:00:00Z","exercises":[],"user_id":"u1"}"#;
        let workout: Workout = serde_json::from_str(json).unwrap();
        assert_eq!(workout.owner_id.as_deref(), Some("u1"));
        assert!(workout.saved_at.is_some());
    }

    #[test]
    fn test_exercise_matches_ignores_case() {
        let exercise = Exercise::new("Bench Press", vec![]);
        assert!(exercise.matches("bench press"));
        assert!(!exercise.matches("bench"));
    }
}
