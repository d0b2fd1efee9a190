//! Progress command implementation.
//!
//! Prints the same report the library computes: streaks and totals, the
//! per-day frequency histogram, the selected exercise's series and the
//! body-weight trend.

use std::path::PathBuf;

use colored::Colorize;

use super::weight::format_change;
use super::{Backend, print_notices, runtime};
use crate::config::today;
use crate::error::Result;
use crate::metrics::{FrequencyPoint, ProgressReport, weight_change};
use crate::validate::parse_range;

/// Histograms longer than this only list days with workouts.
const FULL_HISTOGRAM_DAYS: usize = 31;

/// Execute the progress command.
///
/// # Errors
///
/// Returns an error if the range is invalid or the database is missing.
pub fn execute(
    range: &str,
    exercise: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let range = parse_range(range)?;
    let rt = runtime()?;

    let report = rt.block_on(async {
        let backend = Backend::open(db_path)?;
        let mut tracker = backend.tracker();
        let snapshot = tracker.load_all().await;
        print_notices(&snapshot.notices);
        Ok::<_, crate::error::Error>(tracker.compute_metrics(range, exercise, today()))
    })?;

    if crate::is_csv() {
        println!("date,workouts");
        for point in &report.frequency {
            println!("{},{}", point.date, point.count);
        }
    } else if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ProgressReport) {
    let summary = &report.summary;

    println!(
        "{}",
        format!("━━━ Progress ({}) ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━", report.range)
            .magenta()
            .bold()
    );
    println!();
    println!(
        "Current streak: {}   Best streak: {}   Total workouts: {}",
        days(summary.current_streak).bold(),
        days(summary.best_streak).bold(),
        summary.total_workouts.to_string().bold()
    );
    println!();

    println!("{}", "Workout Frequency".cyan().bold());
    print_histogram(&report.frequency);
    println!();

    if let Some(name) = &report.selected_exercise {
        println!("{}", format!("Exercise: {name}").cyan().bold());
        if report.exercise_series.is_empty() {
            println!("  No weighted sets in this range.");
        } else {
            println!("  {:<12} {:>10} {:>12} {:>5}", "date", "max (kg)", "volume (kg)", "sets");
            for point in &report.exercise_series {
                println!(
                    "  {:<12} {:>10.1} {:>12.1} {:>5}",
                    point.date.to_string(),
                    point.max_weight,
                    point.total_volume,
                    point.sets
                );
            }
        }
        println!();
    }

    if !report.weight_series.is_empty() {
        println!("{}", "Body Weight".cyan().bold());
        for point in &report.weight_series {
            println!("  {}  {:>6.1} kg", point.date, point.weight);
        }
        if let Some(change) = weight_change(&report.weight_series) {
            println!("  Change: {}", format_change(change));
        }
        println!();
    }

    if report.exercise_options.is_empty() {
        println!("{}", "No exercises logged yet.".dimmed());
    } else {
        println!(
            "{} {}",
            "Exercises:".dimmed(),
            report.exercise_options.join(", ")
        );
    }
}

fn print_histogram(points: &[FrequencyPoint]) {
    let full = points.len() <= FULL_HISTOGRAM_DAYS;
    let mut shown = 0;

    for point in points.iter().filter(|p| full || p.count > 0) {
        let bar = "█".repeat(point.count);
        println!("  {}  {} {}", point.date, bar.green(), point.count);
        shown += 1;
    }

    if shown == 0 {
        println!("  No workouts in this range.");
    }
}

fn days(n: usize) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}
