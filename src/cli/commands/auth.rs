//! Auth command implementations.
//!
//! Only stores what it is given. Token acquisition happens outside FitTrack.

use colored::Colorize;
use serde::Serialize;

use crate::cli::AuthCommands;
use crate::config::{
    clear_auth, config_path, load_config, resolve_auth_settings, resolve_auth_state,
    resolve_remote_settings, save_auth,
};
use crate::error::{Error, Result};
use crate::sync::AuthState;

/// Output for auth status.
#[derive(Serialize)]
struct AuthStatusOutput<'a> {
    session: &'a AuthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_user_id: Option<&'a str>,
    has_access_token: bool,
    remote_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_url: Option<&'a str>,
    config_path: String,
}

/// Execute auth commands.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
pub fn execute(command: &AuthCommands, json: bool) -> Result<()> {
    match command {
        AuthCommands::Login { user_id, token } => login(user_id, token.as_deref(), json),
        AuthCommands::Logout => logout(json),
        AuthCommands::Status => status(json),
    }
}

fn login(user_id: &str, token: Option<&str>, json: bool) -> Result<()> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(Error::InvalidArgument("User ID cannot be empty".to_string()));
    }

    if crate::is_dry_run() {
        println!("Would sign in as {user_id}");
        return Ok(());
    }

    save_auth(user_id, token)?;
    let remote = resolve_remote_settings(&load_config()?);

    if crate::is_silent() {
        println!("{user_id}");
    } else if json {
        let output = serde_json::json!({
            "user_id": user_id,
            "remote_configured": remote.is_configured(),
        });
        println!("{output}");
    } else {
        println!("Signed in as {}", user_id.bold());
        if !remote.is_configured() {
            println!(
                "{} no backend configured, records stay local until FT_REMOTE_URL and FT_REMOTE_KEY are set",
                "note:".yellow().bold()
            );
        }
    }

    Ok(())
}

fn logout(json: bool) -> Result<()> {
    if crate::is_dry_run() {
        println!("Would sign out");
        return Ok(());
    }

    let had_auth = clear_auth()?;

    if json {
        println!("{}", serde_json::json!({ "signed_out": had_auth }));
    } else if !crate::is_silent() {
        if had_auth {
            println!("Signed out. Records created from now on stay on this device.");
        } else {
            println!("Not signed in.");
        }
    }

    Ok(())
}

fn status(json: bool) -> Result<()> {
    let config = load_config()?;
    let remote = resolve_remote_settings(&config);
    let auth = resolve_auth_settings(&config);
    let state = resolve_auth_state(&remote, &auth);
    let path = config_path()?;

    if json {
        let output = AuthStatusOutput {
            session: &state,
            stored_user_id: auth.user_id.as_deref(),
            has_access_token: auth.access_token.is_some(),
            remote_configured: remote.is_configured(),
            remote_url: remote.url.as_deref(),
            config_path: path.display().to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    match &state {
        AuthState::Authenticated { user_id } => println!("Signed in as {}", user_id.bold()),
        AuthState::Anonymous => match auth.user_id.as_deref() {
            Some(user_id) => println!(
                "Signed in as {user_id}, but no backend is configured. Working locally."
            ),
            None => println!("Not signed in. Working locally."),
        },
    }
    println!(
        "  Backend: {}",
        remote.url.as_deref().filter(|_| remote.is_configured()).unwrap_or("not configured")
    );
    println!(
        "  Token:   {}",
        if auth.access_token.is_some() { "stored" } else { "none" }
    );
    println!("  Config:  {}", path.display());

    Ok(())
}
