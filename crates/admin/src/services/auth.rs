//! Sign-in, session lookup and sign-out.

use catalog_admin_core::Credentials;
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, CatalogApi, SignIn, UserCheck};
use crate::error::AdminError;
use crate::session::SessionStore;

/// Authentication service.
///
/// Binds an API client to the store that keeps the resulting session.
pub struct AuthService<'a, A, S> {
    api: &'a A,
    store: &'a S,
}

impl<'a, A: CatalogApi, S: SessionStore> AuthService<'a, A, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a A, store: &'a S) -> Self {
        Self { api, store }
    }

    /// Exchange credentials for a session and persist it, replacing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` with `ApiError::Auth` for rejected
    /// credentials, or `AdminError::Session` if the session cannot be saved.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignIn, AdminError> {
        let signed_in = self.api.sign_in(credentials).await?;
        self.store.save(&signed_in.session)?;

        info!(expires_at = %signed_in.session.expires_at, "Signed in");
        Ok(signed_in)
    }

    /// The stored token, if there is an unexpired session.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Session` if the store cannot be read.
    pub fn current_token(&self) -> Result<Option<SecretString>, AdminError> {
        Ok(self.store.load()?.map(|session| session.token))
    }

    /// Ask the service whether `token` is still accepted. `None` means it
    /// was rejected.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` for failures other than a rejected token.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &SecretString) -> Result<Option<UserCheck>, ApiError> {
        match self.api.check(token).await {
            Ok(check) => Ok(Some(check)),
            Err(e) if e.is_auth() => {
                warn!(error = %e, "Stored session was rejected");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Session` if the store cannot be cleared.
    pub fn sign_out(&self) -> Result<(), AdminError> {
        self.store.clear()?;
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use catalog_admin_core::UserId;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::{FakeApi, VALID_PASSWORD, VALID_TOKEN, valid_session};

    #[tokio::test]
    async fn test_sign_in_persists_session() {
        let api = FakeApi::new();
        let store = MemorySessionStore::new();
        let auth = AuthService::new(&api, &store);

        let credentials = Credentials::parse("a@b.com", VALID_PASSWORD).unwrap();
        auth.sign_in(&credentials).await.unwrap();

        let token = auth.current_token().unwrap().unwrap();
        assert_eq!(token.expose_secret(), VALID_TOKEN);
    }

    #[tokio::test]
    async fn test_rejected_sign_in_keeps_store_untouched() {
        let api = FakeApi::new();
        let store = MemorySessionStore::new();
        let auth = AuthService::new(&api, &store);

        let credentials = Credentials::parse("a@b.com", "wrong").unwrap();
        let err = auth.sign_in(&credentials).await.unwrap_err();

        assert!(err.is_auth());
        assert!(auth.current_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify() {
        let api = FakeApi::new();
        let store = MemorySessionStore::new();
        let auth = AuthService::new(&api, &store);

        let check = auth.verify(&SecretString::from(VALID_TOKEN)).await.unwrap();
        assert_eq!(check.unwrap().uid, Some(UserId::new("uid-1")));
        assert!(auth.verify(&SecretString::from("forged")).await.unwrap().is_none());

        api.fail_next(500, "boom");
        assert!(auth.verify(&SecretString::from(VALID_TOKEN)).await.is_err());
    }

    #[test]
    fn test_sign_out_clears_store() {
        let api = FakeApi::new();
        let store = MemorySessionStore::with_session(valid_session());
        let auth = AuthService::new(&api, &store);

        auth.sign_out().unwrap();
        assert!(auth.current_token().unwrap().is_none());
    }
}
