//! Body-weight command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{Backend, CliTracker, not_found, print_notices, runtime};
use crate::cli::WeightCommands;
use crate::config::today;
use crate::error::Result;
use crate::metrics::{weight_change, weight_series};
use crate::model::{BodyMetric, RecordKind};
use crate::validate::{parse_body_weight, parse_date};

/// Output for weight list.
#[derive(Serialize)]
struct WeightListOutput<'a> {
    measurements: Vec<&'a BodyMetric>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    change: Option<f64>,
}

/// Output for weight delete.
#[derive(Serialize)]
struct WeightDeleteOutput<'a> {
    id: &'a str,
    deleted: bool,
}

/// Execute weight commands.
///
/// # Errors
///
/// Returns an error if the database is missing, input is invalid, or the
/// save/delete fails.
pub fn execute(command: &WeightCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(execute_async(command, db_path, json))
}

async fn execute_async(
    command: &WeightCommands,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let backend = Backend::open(db_path)?;
    let mut tracker = backend.tracker();
    let snapshot = tracker.load_all().await;
    print_notices(&snapshot.notices);

    match command {
        WeightCommands::Add { weight, date, id } => {
            add(&mut tracker, weight, date, id.as_deref(), json).await
        }
        WeightCommands::List => list(&tracker, json),
        WeightCommands::Delete { id } => delete(&mut tracker, id, json).await,
    }
}

async fn add(
    tracker: &mut CliTracker<'_>,
    weight: &str,
    date: &str,
    id: Option<&str>,
    json: bool,
) -> Result<()> {
    let weight = parse_body_weight(weight)?;
    let date = parse_date(date, today())?;
    let mut metric = BodyMetric::new(date, weight);

    if let Some(id) = id {
        if tracker.body_metrics().iter().all(|m| m.id != id) {
            return Err(not_found(
                RecordKind::BodyMetric,
                id,
                tracker.body_metrics().iter().map(|m| m.id.as_str()),
            ));
        }
        metric = metric.with_id(id);
    }

    if crate::is_dry_run() {
        if json {
            println!("{}", serde_json::to_string(&metric)?);
        } else {
            println!("Would save {weight} kg on {date}");
        }
        return Ok(());
    }

    let saved = tracker.save_body_metric(metric).await?;

    if crate::is_silent() {
        println!("{}", saved.id);
    } else if json {
        println!("{}", serde_json::to_string(&saved)?);
    } else {
        println!(
            "Saved {} kg on {} ({})",
            saved.weight,
            saved.date,
            saved.id.bold()
        );
    }

    Ok(())
}

fn list(tracker: &CliTracker<'_>, json: bool) -> Result<()> {
    let mut measurements: Vec<&BodyMetric> = tracker.body_metrics().iter().collect();
    measurements.sort_by(|a, b| b.date.cmp(&a.date));
    let change = weight_change(&weight_series(tracker.body_metrics()));

    if crate::is_csv() {
        println!("id,date,weight");
        for m in &measurements {
            println!("{},{},{}", m.id, m.date, m.weight);
        }
    } else if json {
        let output = WeightListOutput {
            count: measurements.len(),
            measurements,
            change,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if measurements.is_empty() {
        println!("No measurements found.");
    } else {
        println!("Body weight ({} measurements):", measurements.len());
        println!();
        for m in &measurements {
            println!("  {}  {:>6.1} kg  {}", m.date, m.weight, m.id.dimmed());
        }
        if let Some(change) = change {
            println!();
            println!("Change: {}", format_change(change));
        }
    }

    Ok(())
}

async fn delete(tracker: &mut CliTracker<'_>, id: &str, json: bool) -> Result<()> {
    if crate::is_dry_run() {
        if tracker.body_metrics().iter().all(|m| m.id != id) {
            return Err(not_found(
                RecordKind::BodyMetric,
                id,
                tracker.body_metrics().iter().map(|m| m.id.as_str()),
            ));
        }
        println!("Would delete measurement {id}");
        return Ok(());
    }

    if !tracker.delete_body_metric(id).await? {
        return Err(not_found(
            RecordKind::BodyMetric,
            id,
            tracker.body_metrics().iter().map(|m| m.id.as_str()),
        ));
    }

    if crate::is_silent() {
        println!("{id}");
    } else if json {
        let output = WeightDeleteOutput { id, deleted: true };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted measurement {id}");
    }

    Ok(())
}

/// Signed change, green when losing and yellow when gaining.
pub(super) fn format_change(change: f64) -> String {
    let text = format!("{change:+.1} kg");
    if change < 0.0 {
        text.green().to_string()
    } else if change > 0.0 {
        text.yellow().to_string()
    } else {
        text
    }
}
