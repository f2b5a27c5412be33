//! Authenticated session record.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

/// A bearer token and the moment the service stops honouring it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Value sent in the `Authorization` header.
    pub token: SecretString,
    /// Server-supplied expiry.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub const fn new(token: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Check whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check whether the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
