//! HTTP implementation of [`CatalogApi`].

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog_admin_core::{Credentials, DataEnvelope, Product, ProductId, ProductPayload, Session};
use chrono::DateTime;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::{AllProductsResponse, SignInRequest, SignInResponse, Status};
use super::{ApiError, CatalogApi, ProductPage, ProductQuery, SignIn, UserCheck};
use crate::config::ApiConfig;

/// Catalog API client.
///
/// Cheap to clone; clones share one connection pool. Holds no credentials:
/// every authenticated call takes the token as an argument.
#[derive(Clone)]
pub struct HexClient {
    inner: Arc<HexClientInner>,
}

struct HexClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_path: String,
}

impl HexClient {
    /// Create a new client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("catalog-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HexClientInner {
                client,
                base_url: config.base_url.clone(),
                api_path: config.api_path.clone(),
            }),
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Parse(format!("cannot extend base URL {}", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL under `/api/{path}/admin/`.
    fn admin_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut full = vec!["api", self.inner.api_path.as_str(), "admin"];
        full.extend_from_slice(segments);
        self.url(&full)
    }

    /// Start an authenticated request.
    fn authorized(&self, method: Method, url: Url, token: &SecretString) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header(AUTHORIZATION, token.expose_secret())
    }

    /// Send a request and decode the body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Catalog API response");

        decode(status, &body)
    }

    /// Send a write request and return the service's confirmation message.
    async fn send_for_message(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let status: Status = self.send(request).await?;
        Ok(status.message_text().unwrap_or_default())
    }
}

/// Map a response onto `T` or the matching [`ApiError`].
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    let envelope: Status = serde_json::from_slice(body).unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Auth(envelope.message_text().unwrap_or_default()));
    }

    if !status.is_success() || !envelope.success {
        let message = envelope.message_text().unwrap_or_else(|| {
            String::from_utf8_lossy(body).trim().chars().take(200).collect()
        });
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(body).map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
}

impl CatalogApi for HexClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignIn, ApiError> {
        let request = self.inner.client.post(self.url(&["admin", "signin"])?).json(&SignInRequest {
            username: credentials.username.as_str(),
            password: credentials.password.expose_secret(),
        });

        // Any refusal from the sign-in endpoint is a credentials problem.
        let response: SignInResponse = self.send(request).await.map_err(|e| match e {
            ApiError::Api { message, .. } => ApiError::Auth(message),
            other => other,
        })?;

        let expires_at = DateTime::from_timestamp_millis(response.expired)
            .ok_or_else(|| ApiError::Parse(format!("invalid expiry timestamp {}", response.expired)))?;

        Ok(SignIn {
            session: Session::new(SecretString::from(response.token), expires_at),
            uid: response.uid,
        })
    }

    #[instrument(skip(self, token))]
    async fn check(&self, token: &SecretString) -> Result<UserCheck, ApiError> {
        let url = self.url(&["api", "user", "check"])?;
        self.send(self.authorized(Method::POST, url, token)).await
    }

    #[instrument(skip(self, token))]
    async fn list_products(
        &self,
        token: &SecretString,
        query: &ProductQuery,
    ) -> Result<ProductPage, ApiError> {
        let url = self.admin_url(&["products"])?;
        self.send(self.authorized(Method::GET, url, token).query(query))
            .await
    }

    #[instrument(skip(self, token))]
    async fn all_products(
        &self,
        token: &SecretString,
    ) -> Result<BTreeMap<ProductId, Product>, ApiError> {
        let url = self.admin_url(&["products", "all"])?;
        let response: AllProductsResponse = self.send(self.authorized(Method::GET, url, token)).await?;
        Ok(response.products)
    }

    #[instrument(skip(self, token, payload), fields(title = %payload.title))]
    async fn create_product(
        &self,
        token: &SecretString,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let url = self.admin_url(&["product"])?;
        let request = self
            .authorized(Method::POST, url, token)
            .json(&DataEnvelope::new(payload));
        self.send_for_message(request).await
    }

    #[instrument(skip(self, token, payload), fields(product_id = %id))]
    async fn update_product(
        &self,
        token: &SecretString,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let url = self.admin_url(&["product", id.as_str()])?;
        let request = self
            .authorized(Method::PUT, url, token)
            .json(&DataEnvelope::new(payload));
        self.send_for_message(request).await
    }

    #[instrument(skip(self, token), fields(product_id = %id))]
    async fn delete_product(&self, token: &SecretString, id: &ProductId) -> Result<String, ApiError> {
        let url = self.admin_url(&["product", id.as_str()])?;
        self.send_for_message(self.authorized(Method::DELETE, url, token))
            .await
    }
}

impl std::fmt::Debug for HexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HexClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_path", &self.inner.api_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> HexClient {
        HexClient::new(&ApiConfig::new(base, "my-shop").unwrap()).unwrap()
    }

    #[test]
    fn test_admin_url_layout() {
        let client = client("https://api.example/v2");
        assert_eq!(
            client.admin_url(&["products", "all"]).unwrap().as_str(),
            "https://api.example/v2/api/my-shop/admin/products/all"
        );
        assert_eq!(
            client.url(&["admin", "signin"]).unwrap().as_str(),
            "https://api.example/v2/admin/signin"
        );
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let client = client("https://api.example/v2/");
        assert_eq!(
            client.url(&["api", "user", "check"]).unwrap().as_str(),
            "https://api.example/v2/api/user/check"
        );
    }

    #[test]
    fn test_product_id_is_percent_encoded() {
        let client = client("https://api.example");
        assert_eq!(
            client.admin_url(&["product", "a/b"]).unwrap().as_str(),
            "https://api.example/api/my-shop/admin/product/a%2Fb"
        );
    }

    #[test]
    fn test_decode_unauthorized() {
        let err = decode::<UserCheck>(
            StatusCode::UNAUTHORIZED,
            br#"{"success":false,"message":"verification failed"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Auth(ref m) if m == "verification failed"));
    }

    #[test]
    fn test_decode_error_status() {
        let err = decode::<UserCheck>(
            StatusCode::BAD_REQUEST,
            br#"{"success":false,"message":["title is required"]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Api { status: 400, ref message } if message == "title is required"
        ));
    }

    #[test]
    fn test_decode_success_false_on_ok_status() {
        let err = decode::<UserCheck>(StatusCode::OK, br#"{"success":false,"message":"nope"}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 200, .. }));
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err = decode::<UserCheck>(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[test]
    fn test_decode_non_json_success_body() {
        let err = decode::<UserCheck>(StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_decode_page() {
        let page: ProductPage = decode(
            StatusCode::OK,
            br#"{"success":true,"products":[{"id":"1","title":"a","price":10}],
                "pagination":{"total_pages":1,"current_page":1,"has_pre":false,"has_next":false,"category":""}}"#,
        )
        .unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_debug_output() {
        let debug_output = format!("{:?}", client("https://api.example"));
        assert!(debug_output.contains("my-shop"));
    }
}
