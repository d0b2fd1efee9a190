//! Input validation for command-line arguments.
//!
//! Time ranges resolve in three tiers: exact match, then synonym lookup,
//! then an error with the closest suggestion. Exercise specs and dates are
//! parsed into model values here so handlers stay thin.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};

use crate::error::{Error, Result};
use crate::metrics::TimeRange;
use crate::model::{Exercise, WorkoutSet};

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_RANGES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["all", "month", "week"].into_iter().collect());

// ── Synonym maps ─────────────────────────────────────────────

pub static RANGE_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("everything", "all"),
        ("ever", "all"),
        ("total", "all"),
        ("lifetime", "all"),
        ("30d", "month"),
        ("1m", "month"),
        ("monthly", "month"),
        ("7d", "week"),
        ("1w", "week"),
        ("weekly", "week"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a time range via exact match or synonym lookup.
///
/// Returns the range, or an error with the original input and an optional
/// suggestion.
pub fn normalize_range(input: &str) -> std::result::Result<TimeRange, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    let canonical = if VALID_RANGES.contains(lower.as_str()) {
        lower.as_str()
    } else if let Some(&canonical) = RANGE_SYNONYMS.get(lower.as_str()) {
        // Tier 2: synonym lookup
        canonical
    } else {
        // Tier 3: closest suggestion
        let suggestion = find_closest_match(&lower, &VALID_RANGES, &RANGE_SYNONYMS);
        return Err((input.to_string(), suggestion));
    };

    canonical
        .parse()
        .map_err(|_| (input.to_string(), None))
}

/// Parse a range argument into a `TimeRange`, as a CLI error on failure.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` naming the bad range.
pub fn parse_range(input: &str) -> Result<TimeRange> {
    normalize_range(input).map_err(|(value, suggestion)| {
        let mut msg = format!("Unknown time range '{value}'");
        if let Some(s) = suggestion {
            msg.push_str(&format!(" (did you mean '{s}'?)"));
        }
        Error::InvalidArgument(msg)
    })
}

/// Parse `YYYY-MM-DD`, `today` or `yesterday` relative to `today`.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` for anything else.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid date: {input}"))),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            Error::InvalidArgument(format!(
                "Invalid date '{input}': expected YYYY-MM-DD, today or yesterday"
            ))
        }),
    }
}

/// Parse a body weight in kilograms.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` unless the value is a positive number.
pub fn parse_body_weight(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(w) if w.is_finite() && w > 0.0 => Ok(w),
        _ => Err(Error::InvalidArgument(format!(
            "Invalid weight '{input}': expected a positive number of kilograms"
        ))),
    }
}

/// Parse an exercise spec: `Name` or `Name:WEIGHTxREPS,WEIGHTxREPS`.
///
/// An exercise without sets gets one empty placeholder set. Weight and reps
/// are kept as entered.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the name is blank or a set lacks the
/// `x` separator.
pub fn parse_exercise_spec(spec: &str) -> Result<Exercise> {
    let (name, sets) = match spec.split_once(':') {
        Some((name, sets)) => (name.trim(), sets.trim()),
        None => (spec.trim(), ""),
    };

    if name.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "Invalid exercise '{spec}': missing exercise name"
        )));
    }

    let mut parsed = Vec::new();
    for part in sets.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (weight, reps) = part
            .split_once(['x', 'X', '*'])
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Invalid exercise set '{part}' in '{spec}': expected WEIGHTxREPS"
                ))
            })?;
        parsed.push(WorkoutSet::new(weight.trim(), reps.trim()));
    }

    if parsed.is_empty() {
        parsed.push(WorkoutSet::default());
    }

    Ok(Exercise::new(name, parsed))
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 2 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            best = Some((synonyms.get(v).copied().unwrap_or(v), dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find existing record ids similar to the searched id.
///
/// Returns up to `max` suggestions with edit distance ≤ 3, sorted by
/// distance then alphabetically.
#[must_use]
pub fn find_similar_ids<'a>(searched: &str, existing: impl IntoIterator<Item = &'a str>, max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .into_iter()
        .map(|id| (levenshtein_distance(searched, id), id))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}
