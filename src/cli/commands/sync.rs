//! Sync command implementation.
//!
//! Loads both collections from the account, which uploads any local-only
//! records first. With `--dry-run` it only lists what would be uploaded.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{Backend, print_notices, runtime};
use crate::error::{Error, Result};
use crate::model::RecordKind;
use crate::remote::RemoteError;
use crate::sync::Notice;
use crate::tracker::PendingUpload;

/// Output for sync.
#[derive(Serialize)]
struct SyncOutput<'a> {
    user_id: &'a str,
    workouts: usize,
    body_metrics: usize,
    uploaded_workouts: usize,
    uploaded_body_metrics: usize,
    notices: &'a [Notice],
}

/// Output for sync --dry-run.
#[derive(Serialize)]
struct SyncPreviewOutput<'a> {
    user_id: &'a str,
    pending: &'a PendingUpload,
}

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error if the backend is not configured, no user is signed
/// in, or any collection failed to load or upload.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(execute_async(db_path, json))
}

async fn execute_async(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let backend = Backend::open(db_path)?;

    if !backend.remote.is_configured() {
        return Err(RemoteError::NotConfigured.into());
    }
    let user_id = backend
        .auth
        .user_id()
        .ok_or(Error::NotAuthenticated)?
        .to_string();

    let mut tracker = backend.tracker();

    if crate::is_dry_run() {
        let pending = tracker.pending_upload().await?;
        if json {
            let output = SyncPreviewOutput {
                user_id: &user_id,
                pending: &pending,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if pending.workouts.is_empty() && pending.body_metrics.is_empty() {
            println!("Nothing to upload for {user_id}.");
        } else {
            println!("Would upload for {user_id}:");
            for w in &pending.workouts {
                println!("  workout     {} {}", w.date, w.id.dimmed());
            }
            for m in &pending.body_metrics {
                println!("  body metric {} {:.1} kg {}", m.date, m.weight, m.id.dimmed());
            }
        }
        return Ok(());
    }

    let snapshot = tracker.load_all().await;
    let uploaded = |kind: RecordKind| {
        snapshot
            .notices
            .iter()
            .map(|n| match n {
                Notice::Synced { kind: k, count } if *k == kind => *count,
                _ => 0,
            })
            .sum::<usize>()
    };

    if json {
        let output = SyncOutput {
            user_id: &user_id,
            workouts: snapshot.workouts.len(),
            body_metrics: snapshot.body_metrics.len(),
            uploaded_workouts: uploaded(RecordKind::Workout),
            uploaded_body_metrics: uploaded(RecordKind::BodyMetric),
            notices: &snapshot.notices,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !crate::is_silent() {
        print_notices(&snapshot.notices);
        println!(
            "Synced {} workouts and {} body metrics for {}",
            snapshot.workouts.len(),
            snapshot.body_metrics.len(),
            user_id.bold()
        );
    }

    let failures: Vec<String> = snapshot
        .notices
        .iter()
        .filter(|n| n.is_error())
        .map(ToString::to_string)
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::SyncFailed(failures.join("; ")))
    }
}
