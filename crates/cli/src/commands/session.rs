//! Session commands: `login`, `logout`, `check`.

use std::io::{self, Write};

use catalog_admin::{AdminConfig, AdminError, SessionStore};
use catalog_admin_core::Credentials;

use super::{CommandError, alerted, controller, mounted};
use crate::render;

/// Sign in, store the session and show the first page.
///
/// # Errors
///
/// Returns `CommandError` if the password is missing, the username is not an
/// email address, or the service rejects the credentials.
pub async fn login(
    config: &AdminConfig,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(CommandError::MissingPassword)?;
    let credentials = Credentials::parse(username, password)?;

    let mut state = controller(config)?;
    state.login(&credentials).await.map_err(alerted(&mut state))?;
    tracing::info!(username = %credentials.username, "Signed in");

    let mut out = io::stdout().lock();
    match state.user() {
        Some(uid) => writeln!(out, "Signed in as {} ({uid})", credentials.username)?,
        None => writeln!(out, "Signed in as {}", credentials.username)?,
    }
    render::write_products(&mut out, state.catalog().products(), state.catalog().pagination())?;
    Ok(())
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns `CommandError` if the session file cannot be removed.
pub fn logout(config: &AdminConfig) -> Result<(), CommandError> {
    let mut state = controller(config)?;
    state.logout().map_err(alerted(&mut state))?;
    writeln!(io::stdout().lock(), "Signed out")?;
    Ok(())
}

/// Verify the stored session and report its expiry.
///
/// # Errors
///
/// Returns `CommandError::NotSignedIn` without a usable session.
pub async fn check(config: &AdminConfig) -> Result<(), CommandError> {
    let state = mounted(config).await?;
    let session = state
        .store()
        .load()
        .map_err(AdminError::from)?
        .ok_or(CommandError::NotSignedIn)?;

    let mut out = io::stdout().lock();
    if let Some(uid) = state.user() {
        writeln!(out, "Account {uid}")?;
    }
    writeln!(out, "Session valid until {}", session.expires_at.to_rfc2822())?;
    Ok(())
}
