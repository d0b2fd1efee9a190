//! Workout command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{Backend, CliTracker, not_found, print_notices, runtime};
use crate::cli::WorkoutCommands;
use crate::config::today;
use crate::error::Result;
use crate::model::{Exercise, RecordKind, Workout};
use crate::validate::{parse_date, parse_exercise_spec};

/// Output for workout list.
#[derive(Serialize)]
struct WorkoutListOutput<'a> {
    workouts: Vec<&'a Workout>,
    count: usize,
}

/// Output for workout delete.
#[derive(Serialize)]
struct WorkoutDeleteOutput<'a> {
    id: &'a str,
    deleted: bool,
}

/// Execute workout commands.
///
/// # Errors
///
/// Returns an error if the database is missing, input is invalid, or the
/// save/delete fails.
pub fn execute(command: &WorkoutCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(execute_async(command, db_path, json))
}

async fn execute_async(
    command: &WorkoutCommands,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let backend = Backend::open(db_path)?;
    let mut tracker = backend.tracker();
    let snapshot = tracker.load_all().await;
    print_notices(&snapshot.notices);

    match command {
        WorkoutCommands::Add {
            date,
            exercises,
            id,
        } => add(&mut tracker, date, exercises, id.as_deref(), json).await,
        WorkoutCommands::List { limit } => list(&tracker, *limit, json),
        WorkoutCommands::Delete { id } => delete(&mut tracker, id, json).await,
    }
}

async fn add(
    tracker: &mut CliTracker<'_>,
    date: &str,
    specs: &[String],
    id: Option<&str>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date, today())?;
    let exercises = specs
        .iter()
        .map(|spec| parse_exercise_spec(spec))
        .collect::<Result<Vec<Exercise>>>()?;

    let mut workout = Workout::new(date);
    workout.exercises = exercises;

    if let Some(id) = id {
        if !tracker.workouts().iter().any(|w| w.id == id) {
            return Err(not_found(
                RecordKind::Workout,
                id,
                tracker.workouts().iter().map(|w| w.id.as_str()),
            ));
        }
        workout = workout.with_id(id);
    }

    if crate::is_dry_run() {
        if json {
            println!("{}", serde_json::to_string(&workout)?);
        } else {
            println!(
                "Would save workout on {} ({} exercises, {} sets)",
                workout.date,
                workout.exercises.len(),
                workout.set_count()
            );
        }
        return Ok(());
    }

    let saved = tracker.save_workout(workout).await?;

    if crate::is_silent() {
        println!("{}", saved.id);
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&saved)?);
    } else {
        println!(
            "Saved workout {} on {} ({} exercises, {} sets)",
            saved.id.bold(),
            saved.date,
            saved.exercises.len(),
            saved.set_count()
        );
    }

    Ok(())
}

fn list(tracker: &CliTracker<'_>, limit: Option<usize>, json: bool) -> Result<()> {
    let mut workouts: Vec<&Workout> = tracker.workouts().iter().collect();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        workouts.truncate(limit);
    }

    if crate::is_csv() {
        println!("id,date,exercise,sets");
        for w in &workouts {
            for e in &w.exercises {
                println!(
                    "{},{},{},{}",
                    w.id,
                    w.date,
                    crate::csv_escape(&e.name),
                    crate::csv_escape(&format_sets(e))
                );
            }
        }
    } else if json {
        let output = WorkoutListOutput {
            count: workouts.len(),
            workouts,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if workouts.is_empty() {
        println!("No workouts found.");
    } else {
        println!("Workouts ({} found):", workouts.len());
        println!();
        for w in &workouts {
            println!("{} {}", w.date.to_string().cyan().bold(), w.id.dimmed());
            for e in w.exercises.iter().filter(|e| !e.name.trim().is_empty()) {
                println!("  {:<20} {}", e.name, format_sets(e));
            }
            println!();
        }
    }

    Ok(())
}

async fn delete(tracker: &mut CliTracker<'_>, id: &str, json: bool) -> Result<()> {
    if crate::is_dry_run() {
        if !tracker.workouts().iter().any(|w| w.id == id) {
            return Err(not_found(
                RecordKind::Workout,
                id,
                tracker.workouts().iter().map(|w| w.id.as_str()),
            ));
        }
        println!("Would delete workout {id}");
        return Ok(());
    }

    if !tracker.delete_workout(id).await? {
        return Err(not_found(
            RecordKind::Workout,
            id,
            tracker.workouts().iter().map(|w| w.id.as_str()),
        ));
    }

    if crate::is_silent() {
        println!("{id}");
    } else if json {
        let output = WorkoutDeleteOutput { id, deleted: true };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted workout {id}");
    }

    Ok(())
}

/// `100x5, 110x3`, skipping empty placeholder sets.
fn format_sets(exercise: &Exercise) -> String {
    exercise
        .sets
        .iter()
        .filter(|s| !s.weight.is_empty() || !s.reps.is_empty())
        .map(|s| format!("{}x{}", s.weight, s.reps))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkoutSet;

    #[test]
    fn test_format_sets_skips_placeholders() {
        let exercise = Exercise::new(
            "Squat",
            vec![
                WorkoutSet::new("100", "5"),
                WorkoutSet::default(),
                WorkoutSet::new("110", "3"),
            ],
        );
        assert_eq!(format_sets(&exercise), "100x5, 110x3");
        assert_eq!(format_sets(&Exercise::new("Plank", vec![WorkoutSet::default()])), "");
    }
}
