//! File-backed session store.
//!
//! The record is a single cookie-style line:
//!
//! ```text
//! hexToken=<token>; expires=<RFC 2822 timestamp>
//! ```

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use catalog_admin_core::Session;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{SessionStore, SessionStoreError};

/// Name of the token entry in the session record.
pub const SESSION_COOKIE_NAME: &str = "hexToken";

const EXPIRES_ATTRIBUTE: &str = "expires";

/// Session kept in a file readable only by the current user.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session = parse_record(&contents)?;
        if session.is_expired() {
            debug!(path = %self.path.display(), "Stored session has expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let record = format_record(session)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(record.as_bytes())?;
        file.sync_all()?;

        #[cfg(unix)]
        {
            // `mode` only applies when the file is created.
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), expires_at = %session.expires_at, "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn format_record(session: &Session) -> Result<String, SessionStoreError> {
    let token = session.token.expose_secret();
    if token.is_empty() || token.contains([';', '\n', '\r']) {
        return Err(SessionStoreError::Malformed(
            "token is empty or contains a reserved character".to_string(),
        ));
    }
    Ok(format!(
        "{SESSION_COOKIE_NAME}={token}; {EXPIRES_ATTRIBUTE}={}\n",
        session.expires_at.to_rfc2822()
    ))
}

fn parse_record(contents: &str) -> Result<Session, SessionStoreError> {
    let mut token = None;
    let mut expires_at = None;

    for part in contents.trim().split(';') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            SESSION_COOKIE_NAME => token = Some(value.trim().to_string()),
            key if key.eq_ignore_ascii_case(EXPIRES_ATTRIBUTE) => {
                let parsed = DateTime::parse_from_rfc2822(value.trim()).map_err(|e| {
                    SessionStoreError::Malformed(format!("invalid expiry '{}': {e}", value.trim()))
                })?;
                expires_at = Some(parsed.with_timezone(&Utc));
            }
            _ => {}
        }
    }

    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SessionStoreError::Malformed(format!("missing {SESSION_COOKIE_NAME}")))?;
    let expires_at =
        expires_at.ok_or_else(|| SessionStoreError::Malformed("missing expiry".to_string()))?;

    Ok(Session::new(SecretString::from(token), expires_at))
}
