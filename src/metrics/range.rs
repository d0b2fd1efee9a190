//! Time-range windows.
//!
//! Dates are calendar days; no time-of-day or timezone is involved once
//! `today` is known.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::Record;

/// Reporting window for filtered views and the frequency histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    Month,
    Week,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Month => "month",
            Self::Week => "week",
        }
    }

    /// First day inside the window, or `None` for an unbounded range.
    ///
    /// - `Week`: seven days before `today`.
    /// - `Month`: the same day of the previous month, clamped to that
    ///   month's last day (March 31 gives February 28 or 29).
    #[must_use]
    pub fn window_start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::All => None,
            Self::Week => Some(today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN)),
            Self::Month => Some(
                today
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(NaiveDate::MIN),
            ),
        }
    }

    /// Records dated on or after the window start, in input order.
    #[must_use]
    pub fn filter<R: Record>(&self, records: &[R], today: NaiveDate) -> Vec<R> {
        match self.window_start(today) {
            None => records.to_vec(),
            Some(start) => records.iter().filter(|r| r.date() >= start).cloned().collect(),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            other => Err(format!("unknown range '{other}'")),
        }
    }
}
