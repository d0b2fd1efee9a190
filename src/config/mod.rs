//! Configuration management.
//!
//! This module resolves where FitTrack keeps its data and how it reaches
//! the hosted backend.
//!
//! # Layout
//!
//! - **Database**: `~/.fittrack/data/fittrack.db`
//! - **Settings**: `~/.fittrack/config.json`
//!
//! Environment variables override the settings file:
//! `FT_DB`, `FT_CONFIG`, `FT_REMOTE_URL`, `FT_REMOTE_KEY`, `FT_USER_ID`,
//! `FT_ACCESS_TOKEN`.

mod settings;

pub use settings::{
    AuthSettings, FitTrackConfig, clear_auth, config_path, load_config, load_config_from,
    save_auth, save_config, save_config_to,
};

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::remote::RemoteSettings;
use crate::sync::AuthState;

/// Get the global FitTrack directory, `~/.fittrack/`.
#[must_use]
pub fn global_fittrack_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".fittrack"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `FT_DB` environment variable
/// 3. Global location: `~/.fittrack/data/fittrack.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(db_path) = env_var("FT_DB") {
        return Some(PathBuf::from(db_path));
    }

    global_fittrack_dir().map(|dir| dir.join("data").join("fittrack.db"))
}

/// Non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Remote settings from the config file with environment overrides.
#[must_use]
pub fn resolve_remote_settings(config: &FitTrackConfig) -> RemoteSettings {
    resolve_remote_settings_with(config, env_var)
}

/// Like [`resolve_remote_settings`] with an explicit variable lookup.
pub fn resolve_remote_settings_with(
    config: &FitTrackConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> RemoteSettings {
    let file = config.remote.clone().unwrap_or_default();
    RemoteSettings {
        url: lookup("FT_REMOTE_URL").or(file.url),
        anon_key: lookup("FT_REMOTE_KEY").or(file.anon_key),
        timeout_secs: file.timeout_secs,
    }
}

/// Stored sign-in with environment overrides.
#[must_use]
pub fn resolve_auth_settings(config: &FitTrackConfig) -> AuthSettings {
    resolve_auth_settings_with(config, env_var)
}

/// Like [`resolve_auth_settings`] with an explicit variable lookup.
pub fn resolve_auth_settings_with(
    config: &FitTrackConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AuthSettings {
    let file = config.auth.clone().unwrap_or_default();
    AuthSettings {
        user_id: lookup("FT_USER_ID").or(file.user_id),
        access_token: lookup("FT_ACCESS_TOKEN").or(file.access_token),
    }
}

/// The session's auth state.
///
/// Authenticated only when a user id is known and the backend is
/// configured; otherwise everything stays local.
#[must_use]
pub fn resolve_auth_state(remote: &RemoteSettings, auth: &AuthSettings) -> AuthState {
    if remote.is_configured() {
        AuthState::for_user(auth.user_id.as_deref())
    } else {
        AuthState::Anonymous
    }
}

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_db_path_explicit_wins() {
        let path = resolve_db_path(Some(Path::new("/tmp/custom.db")));
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.db")));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = FitTrackConfig {
            remote: Some(RemoteSettings {
                url: Some("https://file.example".into()),
                anon_key: Some("file-key".into()),
                timeout_secs: Some(5),
            }),
            auth: Some(AuthSettings {
                user_id: Some("file-user".into()),
                access_token: Some("file-token".into()),
            }),
        };
        let env = lookup(&[("FT_REMOTE_URL", "https://env.example"), ("FT_USER_ID", "env-user")]);

        let remote = resolve_remote_settings_with(&config, &env);
        assert_eq!(remote.url.as_deref(), Some("https://env.example"));
        assert_eq!(remote.anon_key.as_deref(), Some("file-key"));
        assert_eq!(remote.timeout_secs, Some(5));

        let auth = resolve_auth_settings_with(&config, &env);
        assert_eq!(auth.user_id.as_deref(), Some("env-user"));
        assert_eq!(auth.access_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_auth_requires_configured_remote() {
        let auth = AuthSettings {
            user_id: Some("u-1".into()),
            access_token: None,
        };

        let unconfigured = RemoteSettings::default();
        assert_eq!(resolve_auth_state(&unconfigured, &auth), AuthState::Anonymous);

        let configured = RemoteSettings {
            url: Some("https://example.supabase.co".into()),
            anon_key: Some("anon".into()),
            timeout_secs: None,
        };
        assert!(resolve_auth_state(&configured, &auth).is_authenticated());
        assert_eq!(
            resolve_auth_state(&configured, &AuthSettings::default()),
            AuthState::Anonymous
        );
    }
}
