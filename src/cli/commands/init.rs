//! Initialize the FitTrack database.
//!
//! Creates `~/.fittrack/data/fittrack.db` (or the path given by `--db` /
//! `FT_DB`) with the schema applied. Every other record command requires
//! this file to exist.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    reinitialized: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `Error::AlreadyInitialized` if the database exists and `force`
/// is not set, or an error if it cannot be created.
pub fn execute(db_path: Option<&PathBuf>, force: bool, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path()))
        .ok_or_else(|| Error::Config("Could not determine the FitTrack data directory".to_string()))?;

    let existed = db_path.exists();
    if existed && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if crate::is_dry_run() {
        println!("Would create database at {}", db_path.display());
        return Ok(());
    }

    if existed {
        remove_database(&db_path)?;
    }

    // Opening creates the parent directory and applies the schema.
    SqliteStorage::open(&db_path)?;
    info!(path = %db_path.display(), "Initialized database");

    if json {
        let output = InitOutput {
            database: db_path,
            reinitialized: existed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !crate::is_silent() {
        println!("Initialized FitTrack database");
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: log a workout with 'ft workout add -e \"Squat:100x5\"'.");
    }

    Ok(())
}

/// Remove the database file and its WAL side files.
fn remove_database(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            fs::remove_file(side)?;
        }
    }
    Ok(())
}
