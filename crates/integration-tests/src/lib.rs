//! Integration tests for the catalog admin.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-admin-integration-tests
//! ```
//!
//! No external service is needed: [`MockServer`] serves the admin API's wire
//! contract from memory on a loopback port, and the tests drive the real
//! HTTP client against it.
//!
//! # Contract
//!
//! - `POST /admin/signin` - `{username, password}` to `{token, expired, uid}`
//! - `POST /api/user/check` - token check
//! - `GET /api/{path}/admin/products[?page=&category=]` - one page of ten
//! - `GET /api/{path}/admin/products/all` - every product keyed by id
//! - `POST /api/{path}/admin/product` - create from `{data}`
//! - `PUT`/`DELETE /api/{path}/admin/product/{id}` - update/delete
//!
//! Admin routes want the raw token in `Authorization` and answer 401 without
//! it. Everything is served under `/v2` to exercise base URLs with a path.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use catalog_admin::{ApiConfig, HexClient};
use catalog_admin_core::{Product, ProductId, ProductPayload};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Username the double accepts.
pub const MOCK_USERNAME: &str = "admin@example.com";

/// Password the double accepts.
pub const MOCK_PASSWORD: &str = "hunter2";

/// Tenant path the double serves.
pub const MOCK_API_PATH: &str = "test-shop";

/// Products per page.
pub const PAGE_SIZE: usize = 10;

/// Build a product with the given id and title, priced at 100.
///
/// # Panics
///
/// Never; the literal always deserializes.
#[must_use]
pub fn product(id: &str, title: &str) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "category": "general",
        "unit": "pc",
        "origin_price": 120,
        "price": 100,
        "is_enabled": 1
    }))
    .expect("product literal is valid")
}

/// One request as the double saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    products: Vec<Product>,
    tokens: Vec<String>,
    issued: u64,
    created: u64,
    requests: Vec<RecordedRequest>,
    last_body: Option<Value>,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The admin API double, served until dropped.
pub struct MockServer {
    base_url: String,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Bind a loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    pub async fn start() -> Self {
        let state = SharedState::default();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read mock address");

        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server error");
        });

        Self {
            base_url: format!("http://{addr}/v2"),
            state,
            handle,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// API configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Never for the built-in base URL and path.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url, MOCK_API_PATH).expect("mock config is valid")
    }

    /// A real client pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> HexClient {
        HexClient::new(&self.api_config()).expect("Failed to create HTTP client")
    }

    pub fn insert(&self, product: Product) {
        lock(&self.state).products.push(product);
    }

    /// Add `count` products titled `Product N` with ids `-MockN`.
    pub fn seed(&self, count: usize) {
        for n in 1..=count {
            self.insert(product(&format!("-Mock{n}"), &format!("Product {n}")));
        }
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state).products.clone()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// JSON body of the last create or update.
    #[must_use]
    pub fn last_body(&self) -> Option<Value> {
        lock(&self.state).last_body.clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/admin/signin", post(sign_in))
        .route("/api/user/check", post(check))
        .route("/api/{path}/admin/products", get(list_products))
        .route("/api/{path}/admin/products/all", get(all_products))
        .route("/api/{path}/admin/product", post(create_product))
        .route(
            "/api/{path}/admin/product/{id}",
            put(update_product).delete(delete_product),
        );

    Router::new()
        .nest("/v2", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_owned),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };
    lock(&state).requests.push(recorded);
    next.run(request).await
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn failure(status: StatusCode, message: impl Into<Value>) -> Response {
    reply(status, json!({ "success": false, "message": message.into() }))
}

fn token_accepted(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| state.tokens.iter().any(|t| t == token))
}

/// Token and tenant checks shared by the admin routes.
fn authorize(state: &MockState, headers: &HeaderMap, path: &str) -> Result<(), Response> {
    if !token_accepted(state, headers) {
        return Err(failure(StatusCode::UNAUTHORIZED, "Please sign in again"));
    }
    if path != MOCK_API_PATH {
        return Err(failure(StatusCode::NOT_FOUND, "Unknown API path"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct SignInBody {
    username: String,
    password: String,
}

async fn sign_in(State(state): State<SharedState>, Json(body): Json<SignInBody>) -> Response {
    if body.username != MOCK_USERNAME || body.password != MOCK_PASSWORD {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "message": "Sign-in failed",
                "error": { "code": "auth/wrong-password" }
            }),
        );
    }

    let mut state = lock(&state);
    state.issued += 1;
    let token = format!("mock-token-{}", state.issued);
    state.tokens.push(token.clone());

    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "message": "Signed in",
            "uid": "mock-uid",
            "token": token,
            "expired": (Utc::now() + Duration::days(10)).timestamp_millis()
        }),
    )
}

async fn check(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if token_accepted(&lock(&state), &headers) {
        reply(StatusCode::OK, json!({ "success": true, "uid": "mock-uid" }))
    } else {
        failure(StatusCode::UNAUTHORIZED, "Please sign in again")
    }
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
    category: Option<String>,
}

async fn list_products(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, &path) {
        return response;
    }

    let category = query.category.unwrap_or_default();
    let matching: Vec<&Product> = state
        .products
        .iter()
        .filter(|p| category.is_empty() || p.category == category)
        .collect();

    let total_pages = matching.len().div_ceil(PAGE_SIZE);
    let current_page = query.page.unwrap_or(1).max(1) as usize;
    let page: Vec<&Product> = matching
        .into_iter()
        .skip((current_page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "products": page,
            "pagination": {
                "total_pages": total_pages,
                "current_page": current_page,
                "has_pre": current_page > 1,
                "has_next": current_page < total_pages,
                "category": category
            },
            "messages": []
        }),
    )
}

async fn all_products(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authorize(&state, &headers, &path) {
        return response;
    }

    let products: BTreeMap<&str, &Product> = state
        .products
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();
    reply(StatusCode::OK, json!({ "success": true, "products": products }))
}

/// Pull the payload out of `{data: ...}`, with the service's required-field
/// validation.
fn payload(body: &Value) -> Result<ProductPayload, Response> {
    let Some(data) = body.get("data") else {
        return Err(failure(StatusCode::BAD_REQUEST, "data is required"));
    };

    let missing: Vec<String> = ["title", "category", "unit"]
        .into_iter()
        .filter(|field| data.get(field).and_then(Value::as_str).is_none_or(str::is_empty))
        .map(|field| format!("{field} is required"))
        .collect();
    if !missing.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, missing));
    }

    serde_json::from_value(data.clone())
        .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("invalid product: {e}")))
}

async fn create_product(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, &path) {
        return response;
    }
    state.last_body = Some(body.clone());

    let payload = match payload(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    state.created += 1;
    let id = ProductId::new(format!("-Created{}", state.created));
    let num = Some(state.created);
    state.products.push(payload.into_product(id, num));

    reply(StatusCode::OK, json!({ "success": true, "message": "Product created" }))
}

async fn update_product(
    State(state): State<SharedState>,
    Path((path, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, &path) {
        return response;
    }
    state.last_body = Some(body.clone());

    let payload = match payload(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let Some(slot) = state.products.iter_mut().find(|p| p.id.as_str() == id) else {
        return failure(StatusCode::BAD_REQUEST, "Product not found");
    };
    let num = slot.num;
    *slot = payload.into_product(ProductId::new(id), num);

    reply(StatusCode::OK, json!({ "success": true, "message": "Product updated" }))
}

async fn delete_product(
    State(state): State<SharedState>,
    Path((path, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&state, &headers, &path) {
        return response;
    }

    let before = state.products.len();
    state.products.retain(|p| p.id.as_str() != id);
    if state.products.len() == before {
        return failure(StatusCode::BAD_REQUEST, "Product not found");
    }

    reply(StatusCode::OK, json!({ "success": true, "message": "Product deleted" }))
}
