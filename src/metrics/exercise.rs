//! Per-exercise progress.
//!
//! Set weights and reps arrive as free text. They are parsed here, once,
//! with lenient prefix rules: `"62.5kg"` is 62.5, `"8 reps"` is 8, and
//! anything without a leading number is 0.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Workout, WorkoutSet};

/// Progress of one exercise within one workout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgressPoint {
    pub date: NaiveDate,
    pub max_weight: f64,
    pub total_volume: f64,
    pub sets: usize,
}

/// A set with numeric fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedSet {
    pub weight: f64,
    pub reps: i64,
}

impl From<&WorkoutSet> for ParsedSet {
    fn from(set: &WorkoutSet) -> Self {
        Self {
            weight: parse_weight(&set.weight),
            reps: parse_reps(&set.reps),
        }
    }
}

/// Length of the leading run of ASCII digits.
fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parse the longest leading decimal number, or 0.
#[must_use]
pub fn parse_weight(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digit_run(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digit_run(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digit_run(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse the leading integer, or 0.
#[must_use]
pub fn parse_reps(text: &str) -> i64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = digit_run(&bytes[sign..]);
    if digits == 0 {
        return 0;
    }
    s[..sign + digits].parse().unwrap_or(0)
}

/// Distinct lower-cased exercise names across all workouts, sorted.
#[must_use]
pub fn exercise_options(workouts: &[Workout]) -> Vec<String> {
    workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .filter(|e| !e.name.is_empty())
        .map(|e| e.name.to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Progress series for `exercise` (case-insensitive), ascending by date.
///
/// One point per workout containing the exercise; several entries of the
/// same exercise in one workout are combined. Workouts without a positive
/// weight are left out.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn exercise_series(workouts: &[Workout], exercise: &str) -> Vec<ExerciseProgressPoint> {
    if exercise.trim().is_empty() {
        return Vec::new();
    }

    let mut points: Vec<ExerciseProgressPoint> = workouts
        .iter()
        .filter_map(|workout| {
            let sets: Vec<ParsedSet> = workout
                .exercises
                .iter()
                .filter(|e| e.matches(exercise))
                .flat_map(|e| e.sets.iter().map(ParsedSet::from))
                .collect();

            let max_weight = sets.iter().map(|s| s.weight).fold(0.0, f64::max);
            if max_weight <= 0.0 {
                return None;
            }

            Some(ExerciseProgressPoint {
                date: workout.date,
                max_weight,
                total_volume: sets.iter().map(|s| s.weight * s.reps as f64).sum(),
                sets: sets.len(),
            })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Exercise;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn workout(day: &str, name: &str, sets: &[(&str, &str)]) -> Workout {
        Workout::new(date(day)).with_exercise(Exercise::new(
            name,
            sets.iter().map(|(w, r)| WorkoutSet::new(*w, *r)).collect(),
        ))
    }

    #[test]
    fn test_parse_weight_prefixes() {
        assert!((parse_weight("62.5") - 62.5).abs() < f64::EPSILON);
        assert!((parse_weight(" 100kg") - 100.0).abs() < f64::EPSILON);
        assert!((parse_weight(".5") - 0.5).abs() < f64::EPSILON);
        assert!((parse_weight("1e2") - 100.0).abs() < f64::EPSILON);
        assert!((parse_weight("3e") - 3.0).abs() < f64::EPSILON);
        assert!((parse_weight("-10") + 10.0).abs() < f64::EPSILON);
        assert!(parse_weight("").abs() < f64::EPSILON);
        assert!(parse_weight("heavy").abs() < f64::EPSILON);
        assert!(parse_weight(".").abs() < f64::EPSILON);
        assert!(parse_weight("1e999").abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_reps_prefixes() {
        assert_eq!(parse_reps("5"), 5);
        assert_eq!(parse_reps("8 reps"), 8);
        assert_eq!(parse_reps("5.9"), 5);
        assert_eq!(parse_reps("-2"), -2);
        assert_eq!(parse_reps("x"), 0);
        assert_eq!(parse_reps(""), 0);
    }

    #[test]
    fn test_volume_computation() {
        let workouts = vec![workout("2024-01-01", "Squat", &[("100", "5"), ("110", "3")])];
        let series = exercise_series(&workouts, "Squat");

        assert_eq!(series.len(), 1);
        assert!((series[0].max_weight - 110.0).abs() < f64::EPSILON);
        assert!((series[0].total_volume - 830.0).abs() < f64::EPSILON);
        assert_eq!(series[0].sets, 2);
    }

    #[test]
    fn test_case_insensitive_match() {
        let workouts = vec![workout("2024-01-01", "Bench Press", &[("60", "8")])];
        assert_eq!(exercise_series(&workouts, "bench press").len(), 1);
        assert!(exercise_series(&workouts, "squat").is_empty());
        assert!(exercise_series(&workouts, "").is_empty());
    }

    #[test]
    fn test_unweighted_workouts_excluded_and_sorted() {
        let workouts = vec![
            workout("2024-01-03", "Squat", &[("100", "5")]),
            workout("2024-01-02", "Squat", &[("", "10"), ("abc", "5")]),
            workout("2024-01-01", "squat", &[("90", "x")]),
        ];
        let series = exercise_series(&workouts, "SQUAT");

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-03")]);
        assert!(series[0].total_volume.abs() < f64::EPSILON);
    }

    #[test]
    fn test_repeated_entries_combine() {
        let workout = Workout::new(date("2024-01-01"))
            .with_exercise(Exercise::new("Squat", vec![WorkoutSet::new("100", "5")]))
            .with_exercise(Exercise::new("Lunge", vec![WorkoutSet::new("200", "1")]))
            .with_exercise(Exercise::new("squat", vec![WorkoutSet::new("120", "2")]));
        let series = exercise_series(&[workout], "squat");

        assert_eq!(series.len(), 1);
        assert!((series[0].max_weight - 120.0).abs() < f64::EPSILON);
        assert!((series[0].total_volume - 740.0).abs() < f64::EPSILON);
        assert_eq!(series[0].sets, 2);
    }

    #[test]
    fn test_exercise_options() {
        let workouts = vec![
            workout("2024-01-01", "Squat", &[]),
            workout("2024-01-02", "squat", &[]),
            workout("2024-01-02", "Bench Press", &[]),
            workout("2024-01-03", "", &[]),
        ];
        assert_eq!(exercise_options(&workouts), vec!["bench press", "squat"]);
    }
}
