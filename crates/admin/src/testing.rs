//! In-memory [`CatalogApi`] used by the controller and service tests.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use catalog_admin_core::{
    Credentials, Pagination, Product, ProductId, ProductPayload, Session, UserId,
};
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::api::{ApiError, CatalogApi, ProductPage, ProductQuery, SignIn, UserCheck};

/// The only token the fake accepts.
pub const VALID_TOKEN: &str = "T1";

/// The only password the fake accepts.
pub const VALID_PASSWORD: &str = "x";

/// Products per page of `list_products`.
pub const PAGE_SIZE: usize = 10;

/// Build a product with the given id and title and default everything else.
pub fn product(id: &str, title: &str) -> Product {
    serde_json::from_value(json!({ "id": id, "title": title, "price": 100 })).unwrap()
}

/// A session holding [`VALID_TOKEN`].
pub fn valid_session() -> Session {
    Session::new(SecretString::from(VALID_TOKEN), Utc::now() + Duration::days(1))
}

#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

#[derive(Debug, Default)]
struct FakeState {
    products: Vec<Product>,
    next_id: u64,
    revoked: bool,
    fail_next: Option<(Option<&'static str>, u16, String)>,
    calls: Vec<&'static str>,
    last_payload: Option<ProductPayload>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake pre-loaded with `count` products titled `Product N`.
    pub fn with_products(count: usize) -> Self {
        let api = Self::new();
        for n in 1..=count {
            api.insert(product(&format!("p{n}"), &format!("Product {n}")));
        }
        api
    }

    pub fn insert(&self, product: Product) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.products.push(product);
    }

    /// Make every following call with [`VALID_TOKEN`] answer 401.
    pub fn revoke_token(&self) {
        self.state.lock().unwrap().revoked = true;
    }

    /// Answer the next call with this status and message.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((None, status, message.to_string()));
    }

    /// Answer the next call of operation `call` with this status and message.
    pub fn fail_next_call(&self, call: &'static str, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((Some(call), status, message.to_string()));
    }

    /// Names of the operations called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Body of the last create or update.
    pub fn last_payload(&self) -> Option<ProductPayload> {
        self.state.lock().unwrap().last_payload.clone()
    }

    fn begin(
        &self,
        call: &'static str,
        token: Option<&SecretString>,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        let armed = state
            .fail_next
            .as_ref()
            .is_some_and(|(only, _, _)| only.is_none_or(|only| only == call));
        if armed && let Some((_, status, message)) = state.fail_next.take() {
            return Err(if status == 401 {
                ApiError::Auth(message)
            } else {
                ApiError::Api { status, message }
            });
        }
        if let Some(token) = token
            && (state.revoked || token.expose_secret() != VALID_TOKEN)
        {
            return Err(ApiError::Auth("token verification failed".to_string()));
        }
        Ok(state)
    }
}

impl CatalogApi for FakeApi {
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignIn, ApiError> {
        let mut state = self.begin("sign_in", None)?;
        if credentials.password.expose_secret() != VALID_PASSWORD {
            return Err(ApiError::Auth("sign-in failed".to_string()));
        }
        state.revoked = false;
        Ok(SignIn {
            session: valid_session(),
            uid: Some(UserId::new("uid-1")),
        })
    }

    async fn check(&self, token: &SecretString) -> Result<UserCheck, ApiError> {
        self.begin("check", Some(token))?;
        Ok(UserCheck {
            uid: Some(UserId::new("uid-1")),
        })
    }

    async fn list_products(
        &self,
        token: &SecretString,
        query: &ProductQuery,
    ) -> Result<ProductPage, ApiError> {
        let state = self.begin("list_products", Some(token))?;

        let category = query.category.clone().unwrap_or_default();
        let matching: Vec<&Product> = state
            .products
            .iter()
            .filter(|p| category.is_empty() || p.category == category)
            .collect();

        let total_pages = u32::try_from(matching.len().div_ceil(PAGE_SIZE)).unwrap();
        let current_page = query.page.unwrap_or(1).max(1);
        let skip = (current_page as usize - 1) * PAGE_SIZE;

        Ok(ProductPage {
            products: matching.into_iter().skip(skip).take(PAGE_SIZE).cloned().collect(),
            pagination: Pagination {
                total_pages,
                current_page,
                has_pre: current_page > 1,
                has_next: current_page < total_pages,
                category,
            },
        })
    }

    async fn all_products(
        &self,
        token: &SecretString,
    ) -> Result<BTreeMap<ProductId, Product>, ApiError> {
        let state = self.begin("all_products", Some(token))?;
        Ok(state
            .products
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect())
    }

    async fn create_product(
        &self,
        token: &SecretString,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let mut state = self.begin("create_product", Some(token))?;
        state.next_id += 1;
        let id = ProductId::new(format!("p{}", state.next_id));
        let num = Some(state.next_id);
        state.last_payload = Some(payload.clone());
        state.products.push(payload.clone().into_product(id, num));
        Ok("Product created".to_string())
    }

    async fn update_product(
        &self,
        token: &SecretString,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let mut state = self.begin("update_product", Some(token))?;
        state.last_payload = Some(payload.clone());
        let Some(slot) = state.products.iter_mut().find(|p| &p.id == id) else {
            return Err(ApiError::Api {
                status: 400,
                message: "product not found".to_string(),
            });
        };
        *slot = payload.clone().into_product(id.clone(), slot.num);
        Ok("Product updated".to_string())
    }

    async fn delete_product(
        &self,
        token: &SecretString,
        id: &ProductId,
    ) -> Result<String, ApiError> {
        let mut state = self.begin("delete_product", Some(token))?;
        let before = state.products.len();
        state.products.retain(|p| &p.id != id);
        if state.products.len() == before {
            return Err(ApiError::Api {
                status: 400,
                message: "product not found".to_string(),
            });
        }
        Ok("Product deleted".to_string())
    }
}
