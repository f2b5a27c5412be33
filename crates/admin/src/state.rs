//! Controller state shared across handlers.
//!
//! [`AdminState`] owns everything the view renders: the authenticated flag,
//! the pending alert, the fetched catalog and the create/edit workflow.
//! Handlers take `&mut self`, so two mutations on one controller can never
//! overlap. Each remote call runs inside a `loading` span whose `phase`
//! field names the [`Loading`] step, so subscribers see the indicator open
//! and close.
//!
//! # Failure policy
//!
//! Every failed remote call leaves an alert and keeps the state of the last
//! successful fetch. Failures during mount and sign-in (including the first
//! fetch after signing in), and any rejected token, also clear the
//! authenticated flag so the view falls back to the login form. A rejected
//! token is removed from the session store.

use std::fmt;

use catalog_admin_core::{Credentials, Draft, Product, ProductId, UserId};
use secrecy::SecretString;
use tracing::{Instrument, Span, info, info_span, warn};

use crate::api::CatalogApi;
use crate::error::AdminError;
use crate::services::{AuthService, Catalog, DraftWorkflow, Submission};
use crate::session::SessionStore;

/// What the loading indicator is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    Verifying,
    SigningIn,
    Fetching,
    LoadingProduct,
    Saving,
    Deleting,
}

impl Loading {
    /// The span a remote call runs in while this step is pending.
    #[must_use]
    pub fn span(self) -> Span {
        info_span!("loading", phase = %self)
    }
}

impl fmt::Display for Loading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Verifying => "Verifying session",
            Self::SigningIn => "Signing in",
            Self::Fetching => "Loading products",
            Self::LoadingProduct => "Loading product",
            Self::Saving => "Saving product",
            Self::Deleting => "Deleting product",
        })
    }
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Catalog,
}

/// The admin controller.
#[derive(Debug)]
pub struct AdminState<A, S> {
    api: A,
    store: S,
    authenticated: bool,
    user: Option<UserId>,
    alert: Option<String>,
    catalog: Catalog,
    drafts: DraftWorkflow,
}

impl<A: CatalogApi, S: SessionStore> AdminState<A, S> {
    /// Create a signed-out controller. Call [`Self::mount`] to pick up a
    /// stored session.
    #[must_use]
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            authenticated: false,
            user: None,
            alert: None,
            catalog: Catalog::new(),
            drafts: DraftWorkflow::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Account key reported by the service for the signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// The pending alert, if a handler failed.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Remove and return the pending alert.
    pub const fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn drafts(&self) -> &DraftWorkflow {
        &self.drafts
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) const fn api(&self) -> &A {
        &self.api
    }

    /// Which screen to show.
    #[must_use]
    pub const fn view(&self) -> View {
        if self.authenticated {
            View::Catalog
        } else {
            View::Login
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Pick up a stored session: verify it, then load the catalog.
    ///
    /// Without a stored session this succeeds and leaves the controller
    /// signed out.
    ///
    /// # Errors
    ///
    /// Returns the failure of the store, the check or the first fetch; the
    /// controller is signed out afterwards.
    pub async fn mount(&mut self) -> Result<(), AdminError> {
        let result = self.verify_and_load().await;
        result.map_err(|e| self.fail(e, true))
    }

    async fn verify_and_load(&mut self) -> Result<(), AdminError> {
        let auth = AuthService::new(&self.api, &self.store);
        let Some(token) = auth.current_token()? else {
            self.authenticated = false;
            return Ok(());
        };
        let verified = auth
            .verify(&token)
            .instrument(Loading::Verifying.span())
            .await?;
        let Some(check) = verified else {
            return Err(AdminError::NotAuthenticated);
        };

        info!("Stored session verified");
        self.catalog
            .refresh(&self.api, &token)
            .instrument(Loading::Fetching.span())
            .await?;
        self.authenticated = true;
        self.user = check.uid;
        Ok(())
    }

    /// Sign in, persist the session and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns the sign-in failure or the failure of the first fetch. Either
    /// way the controller is signed out afterwards; a session saved before
    /// the fetch failed stays in the store for the next mount.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AdminError> {
        let result = AuthService::new(&self.api, &self.store)
            .sign_in(credentials)
            .instrument(Loading::SigningIn.span())
            .await;
        let signed_in = result.map_err(|e| self.fail(e, true))?;

        self.alert = None;
        self.refresh_with(&signed_in.session.token, true).await?;
        self.authenticated = true;
        self.user = signed_in.uid;
        Ok(())
    }

    /// Forget the session and everything loaded with it.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Session` if the store cannot be cleared.
    pub fn logout(&mut self) -> Result<(), AdminError> {
        self.authenticated = false;
        self.user = None;
        self.catalog.clear();
        self.drafts.cancel();
        let result = AuthService::new(&self.api, &self.store).sign_out();
        result.map_err(|e| self.fail(e, true))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Re-fetch the current page.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the previous list stays.
    pub async fn refresh(&mut self) -> Result<(), AdminError> {
        let Some(token) = self.require_token()? else {
            return Ok(());
        };
        self.refresh_with(&token, false).await
    }

    /// Fetch a specific page. Returns `false` if the page was out of range.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the previous list stays.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool, AdminError> {
        let Some(token) = self.require_token()? else {
            return Ok(false);
        };
        let result = self
            .catalog
            .go_to_page(&self.api, &token, page)
            .instrument(Loading::Fetching.span())
            .await;
        result.map_err(|e| self.fail(e.into(), false))
    }

    /// Filter the list by category (`None` for all) and fetch its first page.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the previous list stays.
    pub async fn filter_category(&mut self, category: Option<String>) -> Result<(), AdminError> {
        self.catalog.set_category(category);
        self.refresh().await
    }

    /// Choose a product of the current page for the detail view.
    pub fn select(&mut self, id: &ProductId) -> Option<&Product> {
        self.catalog.select(id)
    }

    /// Delete a product, then re-fetch. Returns the service's message.
    ///
    /// # Errors
    ///
    /// Returns the delete or refresh failure.
    pub async fn delete(&mut self, id: &ProductId) -> Result<Option<String>, AdminError> {
        let Some(token) = self.require_token()? else {
            return Ok(None);
        };
        let result = self
            .api
            .delete_product(&token, id)
            .instrument(Loading::Deleting.span())
            .await;
        let message = result.map_err(|e| self.fail(e.into(), false))?;

        info!(product_id = %id, "Product deleted");
        self.refresh_with(&token, false).await?;
        Ok(Some(message))
    }

    // =========================================================================
    // Create / edit
    // =========================================================================

    /// Open the empty product form.
    pub fn open_create(&mut self) {
        self.drafts.open_create();
    }

    /// Load a product into the form for editing.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id, or the fetch failure.
    pub async fn open_edit(&mut self, id: &ProductId) -> Result<(), AdminError> {
        let Some(token) = self.require_token()? else {
            return Ok(());
        };
        let result = self
            .drafts
            .open_edit(&self.api, &token, id)
            .instrument(Loading::LoadingProduct.span())
            .await;
        result.map_err(|e| self.fail(e, false))
    }

    /// Field access for the open form.
    pub const fn draft_mut(&mut self) -> &mut Draft {
        self.drafts.draft_mut()
    }

    pub fn add_image_slot(&mut self) -> bool {
        self.drafts.add_image_slot()
    }

    pub fn remove_image_slot(&mut self) -> Option<String> {
        self.drafts.remove_image_slot()
    }

    /// Set the URL of an existing image slot.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidDraft` if there is no such slot.
    pub fn set_image(&mut self, index: usize, url: impl Into<String>) -> Result<(), AdminError> {
        let result = self.drafts.set_image(index, url);
        result.map_err(|e| self.fail(e.into(), false))
    }

    /// Close the form without saving.
    pub fn cancel(&mut self) {
        self.drafts.cancel();
    }

    /// Send the open form as a create or update, then re-fetch.
    ///
    /// The form closes as soon as the request is issued, whatever its
    /// outcome. Returns the service's message, or `None` when nothing was
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidDraft` (form stays open) if a price is not
    /// a number, otherwise the save or refresh failure.
    pub async fn submit(&mut self) -> Result<Option<String>, AdminError> {
        if !self.drafts.is_open() {
            return Ok(None);
        }
        let Some(token) = self.require_token()? else {
            return Ok(None);
        };
        let submission = match self.drafts.begin_submit() {
            Ok(Some(submission)) => submission,
            Ok(None) => return Ok(None),
            Err(e) => return Err(self.fail(e.into(), false)),
        };

        let saving = Loading::Saving.span();
        let result = match &submission {
            Submission::Create(payload) => {
                self.api
                    .create_product(&token, payload)
                    .instrument(saving)
                    .await
            }
            Submission::Update(id, payload) => {
                self.api
                    .update_product(&token, id, payload)
                    .instrument(saving)
                    .await
            }
        };
        let message = result.map_err(|e| self.fail(e.into(), false))?;

        match &submission {
            Submission::Create(payload) => info!(title = %payload.title, "Product created"),
            Submission::Update(id, _) => info!(product_id = %id, "Product updated"),
        }
        self.refresh_with(&token, false).await?;
        Ok(Some(message))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// The stored token. Without one the controller is signed out and
    /// `None` is returned instead of an error.
    fn require_token(&mut self) -> Result<Option<SecretString>, AdminError> {
        let result = AuthService::new(&self.api, &self.store).current_token();
        match result {
            Ok(Some(token)) => Ok(Some(token)),
            Ok(None) => {
                if self.authenticated {
                    info!("Session missing or expired; signing out");
                }
                self.authenticated = false;
                self.user = None;
                Ok(None)
            }
            Err(e) => Err(self.fail(e, true)),
        }
    }

    async fn refresh_with(
        &mut self,
        token: &SecretString,
        signs_out: bool,
    ) -> Result<(), AdminError> {
        let result = self
            .catalog
            .refresh(&self.api, token)
            .instrument(Loading::Fetching.span())
            .await
            .map(|_| ());
        result.map_err(|e| self.fail(e.into(), signs_out))
    }

    /// Record a failure as the pending alert and apply the failure policy.
    fn fail(&mut self, error: AdminError, signs_out: bool) -> AdminError {
        warn!(error = %error, "Admin operation failed");

        if error.is_auth() {
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear rejected session");
            }
            self.catalog.clear();
            self.drafts.cancel();
        }
        if signs_out || error.is_auth() {
            self.authenticated = false;
            self.user = None;
        }

        self.alert = Some(error.user_message());
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use catalog_admin_core::ProductPayload;
    use serde_json::json;
    use tracing::Subscriber;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;
    use crate::services::Modal;
    use crate::session::MemorySessionStore;
    use crate::testing::{FakeApi, VALID_PASSWORD, VALID_TOKEN, product, valid_session};

    type TestState = AdminState<FakeApi, MemorySessionStore>;

    fn signed_in(api: FakeApi) -> TestState {
        AdminState::new(api, MemorySessionStore::with_session(valid_session()))
    }

    async fn mounted(api: FakeApi) -> TestState {
        let mut state = signed_in(api);
        state.mount().await.unwrap();
        state
    }

    fn stored_token(state: &TestState) -> Option<String> {
        use secrecy::ExposeSecret;
        state
            .store()
            .load()
            .unwrap()
            .map(|s| s.token.expose_secret().to_string())
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[tokio::test]
    async fn test_mount_without_session_shows_login() {
        let mut state = AdminState::new(FakeApi::new(), MemorySessionStore::new());
        state.mount().await.unwrap();

        assert_eq!(state.view(), View::Login);
        assert!(state.api().calls().is_empty());
        assert!(state.alert().is_none());
    }

    #[tokio::test]
    async fn test_mount_with_session_loads_catalog() {
        let state = mounted(FakeApi::with_products(3)).await;

        assert_eq!(state.view(), View::Catalog);
        assert_eq!(state.catalog().products().len(), 3);
        assert_eq!(state.api().calls(), ["check", "list_products"]);
        assert_eq!(state.user(), Some(&UserId::new("uid-1")));
    }

    #[tokio::test]
    async fn test_mount_with_rejected_session_signs_out() {
        let api = FakeApi::with_products(1);
        api.revoke_token();
        let mut state = signed_in(api);

        let err = state.mount().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(state.view(), View::Login);
        assert!(state.alert().is_some());
        assert!(stored_token(&state).is_none());
    }

    #[tokio::test]
    async fn test_mount_failure_signs_out() {
        let api = FakeApi::with_products(1);
        api.fail_next(500, "maintenance");
        let mut state = signed_in(api);

        assert!(state.mount().await.is_err());
        assert!(!state.is_authenticated());
        assert_eq!(state.alert(), Some("maintenance"));
    }

    #[tokio::test]
    async fn test_login_stores_session_and_refreshes() {
        let mut state = AdminState::new(FakeApi::with_products(2), MemorySessionStore::new());
        let credentials = Credentials::parse("a@b.com", VALID_PASSWORD).unwrap();

        state.login(&credentials).await.unwrap();

        assert!(state.is_authenticated());
        assert_eq!(stored_token(&state).as_deref(), Some(VALID_TOKEN));
        assert_eq!(state.api().calls(), ["sign_in", "list_products"]);
        assert_eq!(state.catalog().products().len(), 2);
        assert_eq!(state.user(), Some(&UserId::new("uid-1")));
    }

    #[tokio::test]
    async fn test_login_with_failed_first_fetch_shows_login() {
        let api = FakeApi::with_products(2);
        api.fail_next_call("list_products", 404, "Unknown API path");
        let mut state = AdminState::new(api, MemorySessionStore::new());
        let credentials = Credentials::parse("a@b.com", VALID_PASSWORD).unwrap();

        let err = state.login(&credentials).await.unwrap_err();

        assert!(!err.is_auth());
        assert!(!state.is_authenticated());
        assert_eq!(state.view(), View::Login);
        assert!(state.user().is_none());
        assert_eq!(state.alert(), Some("Unknown API path"));
        // The session is kept so the next mount can retry
        assert_eq!(stored_token(&state).as_deref(), Some(VALID_TOKEN));
    }

    #[tokio::test]
    async fn test_login_failure_alerts() {
        let mut state = AdminState::new(FakeApi::new(), MemorySessionStore::new());
        let credentials = Credentials::parse("a@b.com", "wrong").unwrap();

        assert!(state.login(&credentials).await.is_err());
        assert_eq!(state.view(), View::Login);
        assert_eq!(state.take_alert().as_deref(), Some("sign-in failed"));
        assert!(state.alert().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut state = mounted(FakeApi::with_products(2)).await;
        state.open_create();

        state.logout().unwrap();

        assert_eq!(state.view(), View::Login);
        assert!(state.user().is_none());
        assert!(state.catalog().products().is_empty());
        assert_eq!(state.drafts().modal(), &Modal::Closed);
        assert!(stored_token(&state).is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_response_returns_to_login() {
        let mut state = mounted(FakeApi::with_products(2)).await;
        state.api().fail_next(401, "token expired");

        let err = state.refresh().await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(state.view(), View::Login);
        assert_eq!(state.alert(), Some("token expired"));
        assert!(stored_token(&state).is_none());
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[tokio::test]
    async fn test_failed_refresh_keeps_list_and_session() {
        let mut state = mounted(FakeApi::with_products(2)).await;
        state.api().fail_next(500, "");

        assert!(state.refresh().await.is_err());
        assert!(state.is_authenticated());
        assert_eq!(state.catalog().products().len(), 2);
        assert_eq!(state.alert(), Some("Request failed with status 500"));
    }

    #[tokio::test]
    async fn test_go_to_page() {
        let mut state = mounted(FakeApi::with_products(12)).await;

        assert!(state.go_to_page(2).await.unwrap());
        assert_eq!(state.catalog().products().len(), 2);
        assert!(!state.go_to_page(9).await.unwrap());
        assert_eq!(state.catalog().pagination().current_page, 2);
    }

    #[tokio::test]
    async fn test_filter_category() {
        let api = FakeApi::with_products(2);
        let mut toy = product("t1", "Robot");
        toy.category = "toys".to_string();
        api.insert(toy);
        let mut state = mounted(api).await;

        state.filter_category(Some("toys".to_string())).await.unwrap();
        assert_eq!(state.catalog().products().len(), 1);
        assert_eq!(state.catalog().pagination().category, "toys");
    }

    #[tokio::test]
    async fn test_select() {
        let mut state = mounted(FakeApi::with_products(2)).await;
        assert_eq!(state.select(&ProductId::new("p1")).unwrap().title, "Product 1");
    }

    #[tokio::test]
    async fn test_delete_refreshes() {
        let mut state = mounted(FakeApi::with_products(2)).await;

        let message = state.delete(&ProductId::new("p1")).await.unwrap();

        assert_eq!(message.as_deref(), Some("Product deleted"));
        assert_eq!(state.catalog().products().len(), 1);
        assert_eq!(
            state.api().calls(),
            ["check", "list_products", "delete_product", "list_products"]
        );
    }

    #[tokio::test]
    async fn test_delete_without_token_signs_out() {
        let mut state = AdminState::new(FakeApi::with_products(1), MemorySessionStore::new());
        assert_eq!(state.delete(&ProductId::new("p1")).await.unwrap(), None);
        assert!(state.api().calls().is_empty());
        assert!(!state.is_authenticated());
    }

    // =========================================================================
    // Create / edit
    // =========================================================================

    #[tokio::test]
    async fn test_create_sends_numeric_price() {
        let mut state = mounted(FakeApi::new()).await;
        state.open_create();
        state.draft_mut().title = "Lamp".to_string();
        state.draft_mut().price = "100".to_string();
        state.draft_mut().origin_price = "120".to_string();

        let message = state.submit().await.unwrap();

        assert_eq!(message.as_deref(), Some("Product created"));
        let payload = state.api().last_payload().unwrap();
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["price"], json!(100));
        assert_eq!(body["origin_price"], json!(120));
        assert_eq!(body["is_enabled"], json!(1));

        assert_eq!(state.drafts().modal(), &Modal::Closed);
        assert_eq!(state.catalog().products().len(), 1);
        assert_eq!(state.catalog().products()[0].title, "Lamp");
    }

    #[tokio::test]
    async fn test_edit_round_trip() {
        let api = FakeApi::new();
        let mut stored = product("42", "Lamp");
        stored.images_url = vec!["u1".to_string(), "u2".to_string()];
        api.insert(stored.clone());
        let mut state = mounted(api).await;

        state.open_edit(&ProductId::new("42")).await.unwrap();
        assert_eq!(state.drafts().modal(), &Modal::Editing(ProductId::new("42")));
        assert_eq!(state.drafts().draft().images_url.as_slice(), ["u1", "u2"]);

        state.submit().await.unwrap();

        // Unchanged draft sends the product back minus its keys
        assert_eq!(
            state.api().last_payload().unwrap(),
            ProductPayload::from(stored)
        );
        assert!(state.api().calls().contains(&"update_product"));
    }

    #[tokio::test]
    async fn test_open_edit_unknown_id_alerts() {
        let mut state = mounted(FakeApi::with_products(1)).await;

        let err = state.open_edit(&ProductId::new("nope")).await.unwrap_err();

        assert!(matches!(err, AdminError::NotFound(_)));
        assert_eq!(state.alert(), Some("Product not found"));
        assert_eq!(state.drafts().modal(), &Modal::Closed);
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_submit_closes_form() {
        let mut state = mounted(FakeApi::new()).await;
        state.open_create();
        state.draft_mut().title = "Lamp".to_string();
        state.api().fail_next(400, "unit is required");

        assert!(state.submit().await.is_err());

        assert_eq!(state.alert(), Some("unit is required"));
        assert_eq!(state.drafts().modal(), &Modal::Closed);
        assert_eq!(state.drafts().draft(), &Draft::template());
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_price_sends_nothing() {
        let mut state = mounted(FakeApi::new()).await;
        state.open_create();
        state.draft_mut().price = "cheap".to_string();
        let calls = state.api().calls().len();

        let err = state.submit().await.unwrap_err();

        assert!(matches!(err, AdminError::InvalidDraft(_)));
        assert_eq!(state.api().calls().len(), calls);
        assert_eq!(state.drafts().modal(), &Modal::Creating);
    }

    #[tokio::test]
    async fn test_submit_without_token_signs_out() {
        let mut state = AdminState::new(FakeApi::new(), MemorySessionStore::new());
        state.open_create();

        assert_eq!(state.submit().await.unwrap(), None);
        assert!(!state.is_authenticated());
        assert!(state.api().calls().is_empty());
        assert!(state.alert().is_none());
    }

    #[tokio::test]
    async fn test_submit_while_closed_is_noop() {
        let mut state = mounted(FakeApi::new()).await;
        let calls = state.api().calls().len();

        assert_eq!(state.submit().await.unwrap(), None);
        assert_eq!(state.api().calls().len(), calls);
    }

    #[tokio::test]
    async fn test_set_image_out_of_range_alerts() {
        let mut state = mounted(FakeApi::new()).await;
        state.open_create();
        assert!(state.add_image_slot());

        state.set_image(0, "https://img.example/1.png").unwrap();
        assert!(state.set_image(3, "x").is_err());
        assert!(state.alert().is_some());
        assert_eq!(state.remove_image_slot().as_deref(), Some("https://img.example/1.png"));
    }

    #[test]
    fn test_loading_display() {
        assert_eq!(Loading::Saving.to_string(), "Saving product");
        assert_eq!(Loading::Verifying.to_string(), "Verifying session");
    }

    // =========================================================================
    // Loading spans
    // =========================================================================

    /// Collects the `phase` of every `loading` span opened while installed.
    #[derive(Clone, Default)]
    struct PhaseRecorder(Arc<Mutex<Vec<String>>>);

    impl PhaseRecorder {
        fn phases(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct PhaseVisitor(Option<String>);

    impl Visit for PhaseVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "phase" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<T: Subscriber> Layer<T> for PhaseRecorder {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, T>) {
            if attrs.metadata().name() != "loading" {
                return;
            }
            let mut visitor = PhaseVisitor(None);
            attrs.record(&mut visitor);
            if let Some(phase) = visitor.0 {
                self.0.lock().unwrap().push(phase);
            }
        }
    }

    #[tokio::test]
    async fn test_loading_phases_are_traced() {
        let recorder = PhaseRecorder::default();
        let _guard = tracing_subscriber::registry()
            .with(recorder.clone())
            .set_default();

        let mut state = mounted(FakeApi::with_products(2)).await;
        state.delete(&ProductId::new("p1")).await.unwrap();
        state.open_create();
        state.draft_mut().title = "Lamp".to_string();
        state.submit().await.unwrap();

        assert_eq!(
            recorder.phases(),
            [
                "Verifying session",
                "Loading products",
                "Deleting product",
                "Loading products",
                "Saving product",
                "Loading products",
            ]
        );
    }
}
