//! Error types for FitTrack.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::model::RecordKind;
use crate::remote::RemoteError;

/// Result type alias for FitTrack operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    AlreadyInitialized,
    StorageError,

    // Not Found (exit 3)
    RecordNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Auth (exit 5)
    NotAuthenticated,

    // Remote (exit 6)
    RemoteError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::StorageError => "STORAGE_ERROR",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::RemoteError => "REMOTE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::StorageError => 2,
            Self::RecordNotFound => 3,
            Self::InvalidArgument => 4,
            Self::NotAuthenticated => 5,
            Self::RemoteError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying (possibly with corrected input) can succeed.
    ///
    /// The core never retries on its own; this only informs the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::RemoteError | Self::StorageError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in FitTrack operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `ft init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Record not found: {kind} {id}")]
    RecordNotFound { kind: RecordKind, id: String },

    #[error("Record not found: {kind} {id}")]
    RecordNotFoundSimilar {
        kind: RecordKind,
        id: String,
        similar: Vec<String>,
    },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Sync failed: {0}")]
    SyncFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::RecordNotFound { .. } | Self::RecordNotFoundSimilar { .. } => {
                ErrorCode::RecordNotFound
            }
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::Remote(_) | Self::SyncFailed(_) => ErrorCode::RemoteError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `ft init` to create the local database".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::RecordNotFound { kind, id } => {
                let list = match kind {
                    RecordKind::Workout => "ft workout list",
                    RecordKind::BodyMetric => "ft weight list",
                };
                Some(format!("No record with ID '{id}'. Use `{list}` to see saved records."))
            }
            Self::RecordNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::NotAuthenticated => Some(
                "Sign in first:\n  ft auth login <user-id> --token <access-token>\n  \
                 and configure the backend with FT_REMOTE_URL / FT_REMOTE_KEY"
                    .to_string(),
            ),

            Self::Remote(RemoteError::Unauthorized { .. }) => Some(
                "The access token was rejected. Run `ft auth login` again with a fresh token."
                    .to_string(),
            ),
            Self::Remote(RemoteError::NotConfigured) => Some(
                "Set FT_REMOTE_URL and FT_REMOTE_KEY, or add a `remote` block to config.json"
                    .to_string(),
            ),
            Self::Remote(e) if e.is_transient() => {
                Some("Nothing was changed. Check your connection and try again.".to_string())
            }

            Self::SyncFailed(_) => Some(
                "Unsynced records stay on this device. Run `ft sync` again when the backend is reachable."
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("range") {
                    Some("Valid ranges: all, month, week. Synonyms: 7d→week, 30d→month".to_string())
                } else if msg.contains("exercise") {
                    Some("Exercise format: \"Name:WEIGHTxREPS,WEIGHTxREPS\", e.g. \"Squat:100x5,110x3\"".to_string())
                } else {
                    None
                }
            }

            Self::Storage(_) | Self::Remote(_) | Self::Io(_) | Self::Json(_) | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
