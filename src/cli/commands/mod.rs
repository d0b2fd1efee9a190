//! Command implementations.
//!
//! Handlers that touch records share [`Backend`]: the local database, the
//! remote client built from the resolved settings, and the session's auth
//! state. Async work runs on a per-command tokio runtime.

pub mod auth;
pub mod completions;
pub mod init;
pub mod progress;
pub mod sync;
pub mod version;
pub mod weight;
pub mod workout;

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use tracing::debug;

use crate::config::{
    load_config, resolve_auth_settings, resolve_auth_state, resolve_db_path,
    resolve_remote_settings,
};
use crate::error::{Error, Result};
use crate::model::RecordKind;
use crate::remote::RestRemoteStore;
use crate::storage::SqliteStorage;
use crate::sync::{AuthState, Notice};
use crate::tracker::Tracker;

/// Tracker over the CLI's concrete stores.
pub type CliTracker<'a> = Tracker<&'a SqliteStorage, Arc<RestRemoteStore>>;

/// Everything a record command needs.
pub struct Backend {
    pub storage: SqliteStorage,
    pub remote: Arc<RestRemoteStore>,
    pub auth: AuthState,
}

impl Backend {
    /// Open the initialized database and resolve the remote session.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if the database does not exist, or
    /// a config, storage or remote error.
    pub fn open(db_path: Option<&PathBuf>) -> Result<Self> {
        let db_path = resolve_db_path(db_path.map(|p| p.as_path())).ok_or(Error::NotInitialized)?;

        if !db_path.exists() {
            return Err(Error::NotInitialized);
        }

        let storage = SqliteStorage::open(&db_path)?;

        let config = load_config()?;
        let remote_settings = resolve_remote_settings(&config);
        let auth_settings = resolve_auth_settings(&config);
        let auth = resolve_auth_state(&remote_settings, &auth_settings);
        let remote = RestRemoteStore::new(&remote_settings)?
            .with_access_token(auth_settings.access_token);

        debug!(db = %db_path.display(), authenticated = auth.is_authenticated(), "Opened backend");

        Ok(Self {
            storage,
            remote: Arc::new(remote),
            auth,
        })
    }

    /// A tracker for this session, not yet loaded.
    #[must_use]
    pub fn tracker(&self) -> CliTracker<'_> {
        Tracker::new(&self.storage, Arc::clone(&self.remote)).with_auth(self.auth.clone())
    }
}

/// Create the runtime for async command bodies.
///
/// # Errors
///
/// Returns `Error::Other` if the runtime cannot be created.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}

/// Print load notices to stderr.
pub fn print_notices(notices: &[Notice]) {
    if crate::is_silent() {
        return;
    }
    for notice in notices {
        if notice.is_error() {
            eprintln!("{} {notice}", "warning:".yellow().bold());
        } else {
            eprintln!("{} {notice}", "synced:".green().bold());
        }
    }
}

/// Not-found error for `id`, suggesting close matches among `existing`.
pub fn not_found<'a>(
    kind: RecordKind,
    id: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Error {
    let similar = crate::validate::find_similar_ids(id, existing, 3);
    if similar.is_empty() {
        Error::RecordNotFound {
            kind,
            id: id.to_string(),
        }
    } else {
        Error::RecordNotFoundSimilar {
            kind,
            id: id.to_string(),
            similar,
        }
    }
}
