//! Progress metrics engine.
//!
//! Pure functions of the record lists, a time range and an optional
//! selected exercise. Nothing here mutates its input or fails: malformed
//! numbers count as zero and missing data yields empty results.
//!
//! - [`range`] - time windows and filtering
//! - [`streak`] - current/best streak and totals
//! - [`frequency`] - per-day workout histogram
//! - [`exercise`] - exercise options and progress series
//! - [`body`] - body-weight trend

pub mod body;
pub mod exercise;
pub mod frequency;
pub mod range;
pub mod streak;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{BodyMetric, Workout};

pub use body::{WeightPoint, weight_change, weight_series};
pub use exercise::{ExerciseProgressPoint, exercise_options, exercise_series, parse_reps, parse_weight};
pub use frequency::{FrequencyPoint, frequency};
pub use range::TimeRange;
pub use streak::{ProgressSummary, summarize};

/// Everything the progress view shows for one range and exercise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub range: TimeRange,
    pub selected_exercise: Option<String>,
    pub summary: ProgressSummary,
    pub frequency: Vec<FrequencyPoint>,
    pub exercise_series: Vec<ExerciseProgressPoint>,
    /// Newest first.
    pub filtered_workouts: Vec<Workout>,
    /// Newest first.
    pub filtered_body_metrics: Vec<BodyMetric>,
    pub exercise_options: Vec<String>,
    pub weight_series: Vec<WeightPoint>,
}

/// Compute the full report.
///
/// Streaks, totals and exercise options use every workout; the other views
/// use the range-filtered lists.
#[must_use]
pub fn compute(
    workouts: &[Workout],
    body_metrics: &[BodyMetric],
    range: TimeRange,
    selected_exercise: Option<&str>,
    today: NaiveDate,
) -> ProgressReport {
    let mut filtered_workouts = range.filter(workouts, today);
    filtered_workouts.sort_by(|a, b| b.date.cmp(&a.date));

    let mut filtered_body_metrics = range.filter(body_metrics, today);
    filtered_body_metrics.sort_by(|a, b| b.date.cmp(&a.date));

    let selected_exercise = selected_exercise
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let exercise_series = selected_exercise
        .as_deref()
        .map(|name| exercise_series(&filtered_workouts, name))
        .unwrap_or_default();

    ProgressReport {
        range,
        summary: summarize(workouts, today),
        frequency: frequency(workouts, range, today),
        exercise_series,
        weight_series: weight_series(&filtered_body_metrics),
        exercise_options: exercise_options(workouts),
        selected_exercise,
        filtered_workouts,
        filtered_body_metrics,
    }
}
