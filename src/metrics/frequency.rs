//! Workout frequency histogram.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::range::TimeRange;
use crate::model::Workout;

/// Days shown for an unbounded range with no workouts.
const DEFAULT_SPAN_DAYS: u64 = 30;

/// Number of workouts logged on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// One bucket per day from the window start through `today`, ascending.
///
/// For [`TimeRange::All`] the window starts at the earliest workout, or
/// thirty days back when there are none. Workouts outside the window (for
/// example future-dated ones) are not counted.
#[must_use]
pub fn frequency(workouts: &[Workout], range: TimeRange, today: NaiveDate) -> Vec<FrequencyPoint> {
    let start = range
        .window_start(today)
        .or_else(|| workouts.iter().map(|w| w.date).min())
        .unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(DEFAULT_SPAN_DAYS))
                .unwrap_or(today)
        })
        .min(today);

    let mut buckets: Vec<FrequencyPoint> = start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|date| FrequencyPoint { date, count: 0 })
        .collect();

    for workout in workouts {
        let offset = (workout.date - start).num_days();
        if let Some(bucket) = usize::try_from(offset).ok().and_then(|i| buckets.get_mut(i)) {
            bucket.count += 1;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn on(days: &[&str]) -> Vec<Workout> {
        days.iter().map(|d| Workout::new(date(d))).collect()
    }

    #[test]
    fn test_week_has_eight_buckets() {
        let today = date("2024-03-10");
        for workouts in [vec![], on(&["2024-03-10"]), on(&["2024-01-01", "2024-03-09", "2024-03-09"])] {
            let points = frequency(&workouts, TimeRange::Week, today);
            assert_eq!(points.len(), 8);
            assert_eq!(points[0].date, date("2024-03-03"));
            assert_eq!(points[7].date, today);
        }
    }

    #[test]
    fn test_counts_per_day() {
        let workouts = on(&["2024-03-09", "2024-03-09", "2024-03-10", "2024-02-01"]);
        let points = frequency(&workouts, TimeRange::Week, date("2024-03-10"));

        assert_eq!(points[6].count, 2);
        assert_eq!(points[7].count, 1);
        assert_eq!(points.iter().map(|p| p.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_all_starts_at_earliest_workout() {
        let workouts = on(&["2024-03-05", "2024-03-01"]);
        let points = frequency(&workouts, TimeRange::All, date("2024-03-10"));
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], FrequencyPoint { date: date("2024-03-01"), count: 1 });
    }

    #[test]
    fn test_all_without_workouts_spans_thirty_days() {
        let points = frequency(&[], TimeRange::All, date("2024-03-10"));
        assert_eq!(points.len(), 31);
    }

    #[test]
    fn test_future_workouts_are_dropped() {
        let workouts = on(&["2024-03-20"]);
        let points = frequency(&workouts, TimeRange::All, date("2024-03-10"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].count, 0);
    }

    #[test]
    fn test_month_window() {
        let points = frequency(&[], TimeRange::Month, date("2024-03-31"));
        assert_eq!(points[0].date, date("2024-02-29"));
        assert_eq!(points.len(), 32);
    }
}
