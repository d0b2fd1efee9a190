//! Sync state and result types.

use serde::Serialize;

use crate::model::RecordKind;

/// Who the session belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthState {
    /// Local-only operation.
    #[default]
    Anonymous,
    /// Remote-primary operation for `user_id`.
    Authenticated { user_id: String },
}

impl AuthState {
    /// Authenticated state for `user_id`, or anonymous if it is blank.
    #[must_use]
    pub fn for_user(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::Authenticated {
                user_id: id.to_string(),
            },
            _ => Self::Anonymous,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id } => Some(user_id),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Lifecycle of a repository's canonical list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Ready,
}

/// User-facing notification raised by a load.
///
/// Loads never fail; problems are reported here instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Local records were uploaded to the remote store.
    Synced { kind: RecordKind, count: usize },
    /// The remote fetch failed; local data is shown instead.
    LoadFailed { kind: RecordKind, message: String },
    /// Uploading local records failed; they stay local for the next attempt.
    SyncFailed { kind: RecordKind, message: String },
}

impl Notice {
    /// True for failure notices.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Synced { .. })
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced { kind, count } => {
                write!(f, "{count} local {} synced to your account", kind.label())
            }
            Self::LoadFailed { kind, message } => {
                write!(f, "Failed to load {} from the server, showing local data: {message}", kind.label())
            }
            Self::SyncFailed { kind, message } => {
                write!(f, "Failed to sync local {}: {message}", kind.label())
            }
        }
    }
}

/// Result of a repository load.
#[derive(Debug, Clone)]
pub struct LoadOutcome<R> {
    /// The canonical list after the load.
    pub records: Vec<R>,
    pub notices: Vec<Notice>,
}

/// Result of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome<R> {
    /// The records that were uploaded, stamped with owner and save time.
    pub uploaded: Vec<R>,
}

impl<R> ReconcileOutcome<R> {
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }
}
