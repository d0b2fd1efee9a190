//! Settings file management.
//!
//! Loads and saves `~/.fittrack/config.json` (or the file named by
//! `FT_CONFIG`). A missing file means default settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::remote::RemoteSettings;

/// Stored sign-in for the hosted backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitTrackConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSettings>,
}

/// Get the config file path.
///
/// # Errors
///
/// Returns `Error::Config` if no home directory can be determined.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FT_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    super::global_fittrack_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Load configuration from `path`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<FitTrackConfig> {
    if !path.exists() {
        return Ok(FitTrackConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file {}: {e}", path.display())))
}

/// Write configuration to `path`, creating parent directories.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be written.
pub fn save_config_to(path: &Path, config: &FitTrackConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content).map_err(|e| Error::Config(format!("Failed to write config file: {e}")))
}

/// Load the configuration file.
///
/// # Errors
///
/// Returns `Error::Config` if the file exists but cannot be read.
pub fn load_config() -> Result<FitTrackConfig> {
    load_config_from(&config_path()?)
}

/// Save the configuration file.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be written.
pub fn save_config(config: &FitTrackConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Store a sign-in, keeping the rest of the file.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read or written.
pub fn save_auth(user_id: &str, access_token: Option<&str>) -> Result<()> {
    let mut config = load_config()?;
    config.auth = Some(AuthSettings {
        user_id: Some(user_id.to_string()),
        access_token: access_token.map(str::to_string),
    });
    save_config(&config)
}

/// Remove the stored sign-in.
///
/// Returns whether a sign-in was stored.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read or written.
pub fn clear_auth() -> Result<bool> {
    let mut config = load_config()?;
    let had_auth = config.auth.take().is_some();
    if had_auth {
        save_config(&config)?;
    }
    Ok(had_auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, FitTrackConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let config = FitTrackConfig {
            remote: Some(RemoteSettings {
                url: Some("https://example.supabase.co".into()),
                anon_key: Some("anon".into()),
                timeout_secs: Some(10),
            }),
            auth: Some(AuthSettings {
                user_id: Some("u-1".into()),
                access_token: None,
            }),
        };

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("access_token"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{oops").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }
}
