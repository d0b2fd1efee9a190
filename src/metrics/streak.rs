//! Workout streaks.
//!
//! Streaks compare consecutive entries of the date-sorted workout list.
//! Only a gap of exactly one calendar day extends a run, so two workouts
//! logged on the same day end a run rather than continue it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::Workout;

/// Headline numbers for the progress view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub current_streak: usize,
    pub best_streak: usize,
    pub total_workouts: usize,
}

/// Compute streaks over all workouts, ignoring any time range.
#[must_use]
pub fn summarize(workouts: &[Workout], today: NaiveDate) -> ProgressSummary {
    let mut dates: Vec<NaiveDate> = workouts.iter().map(|w| w.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let consecutive = |pair: &[NaiveDate]| (pair[0] - pair[1]).num_days() == 1;

    let current_streak = match dates.first() {
        Some(latest) if (0..=1).contains(&(today - *latest).num_days()) => {
            1 + dates.windows(2).take_while(|pair| consecutive(pair)).count()
        }
        _ => 0,
    };

    let mut longest = usize::from(!dates.is_empty());
    let mut run = 1;
    for pair in dates.windows(2) {
        if consecutive(pair) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    ProgressSummary {
        current_streak,
        best_streak: longest.max(current_streak),
        total_workouts: workouts.len(),
    }
}
