//! Sign-in credentials.

use secrecy::SecretString;

use super::email::{Email, EmailError};

/// Username and password submitted to the sign-in endpoint.
///
/// The password is held as a [`SecretString`] so it never appears in `Debug`
/// output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Administrator email address.
    pub username: Email,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from an already validated username.
    #[must_use]
    pub const fn new(username: Email, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Build credentials from raw form input.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the username is not a structurally valid email.
    pub fn parse(username: &str, password: impl Into<String>) -> Result<Self, EmailError> {
        Ok(Self {
            username: Email::parse(username)?,
            password: SecretString::from(password.into()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_parse_credentials() {
        let creds = Credentials::parse("a@b.com", "x").unwrap();
        assert_eq!(creds.username.as_str(), "a@b.com");
        assert_eq!(creds.password.expose_secret(), "x");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::parse("a@b.com", "hunter2-very-secret").unwrap();
        let debug_output = format!("{creds:?}");
        assert!(debug_output.contains("a@b.com"));
        assert!(!debug_output.contains("hunter2-very-secret"));
    }

    #[test]
    fn test_invalid_username() {
        assert!(Credentials::parse("admin", "x").is_err());
    }
}
