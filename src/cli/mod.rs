//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// FitTrack CLI - Workout and body-weight log with progress analytics
#[derive(Parser, Debug)]
#[command(name = "ft", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.fittrack/data/fittrack.db)
    #[arg(long, global = true, env = "FT_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the record ID (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Preview changes without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the local database
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Log and manage workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },

    /// Log and manage body-weight measurements
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },

    /// Show streaks, frequency and progress charts
    Progress {
        /// Time range (all, month, week)
        #[arg(long, short, default_value = "all")]
        range: String,

        /// Exercise to chart (case-insensitive)
        #[arg(long, short)]
        exercise: Option<String>,
    },

    /// Load from the account and upload local-only records
    Sync,

    /// Manage the stored sign-in
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Workout Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum WorkoutCommands {
    /// Save a workout
    Add {
        /// Workout date (YYYY-MM-DD, today, yesterday)
        #[arg(long, short, default_value = "today")]
        date: String,

        /// Exercise as "Name:WEIGHTxREPS,WEIGHTxREPS" (repeatable)
        #[arg(long = "exercise", short = 'e', required = true)]
        exercises: Vec<String>,

        /// Replace the workout with this ID instead of creating one
        #[arg(long)]
        id: Option<String>,
    },

    /// List workouts, newest first
    List {
        /// Maximum number of workouts to show
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,
    },
}

// ============================================================================
// Weight Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum WeightCommands {
    /// Save a body-weight measurement
    Add {
        /// Weight in kilograms
        weight: String,

        /// Measurement date (YYYY-MM-DD, today, yesterday)
        #[arg(long, short, default_value = "today")]
        date: String,

        /// Replace the measurement with this ID instead of creating one
        #[arg(long)]
        id: Option<String>,
    },

    /// List measurements, newest first
    List,

    /// Delete a measurement
    Delete {
        /// Measurement ID
        id: String,
    },
}

// ============================================================================
// Auth Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a user ID and access token for the hosted backend
    Login {
        /// Account user ID
        user_id: String,

        /// Access token issued by the backend
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored sign-in
    Logout,

    /// Show the sign-in and backend configuration
    Status,
}
