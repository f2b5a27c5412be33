//! Client for the course e-commerce admin API.
//!
//! # API Reference
//!
//! - Base URL: configured (`CATALOG_API_BASE`)
//! - Tenant path: configured (`CATALOG_API_PATH`), used as `/api/{path}/admin/...`
//! - Authentication: the sign-in token is sent verbatim in the
//!   `Authorization` header of every admin request
//! - Bodies: JSON; writes wrap the product in `{ "data": ... }`
//!
//! Every response carries `success` and, on failure, a `message` that is
//! either a string or a list of validation messages.

mod client;
mod types;

pub use client::HexClient;
pub use types::*;

use std::collections::BTreeMap;
use std::future::Future;

use catalog_admin_core::{Credentials, Product, ProductId, ProductPayload};
use secrecy::SecretString;
use thiserror::Error;

/// Fallback alert text when a failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Errors that can occur when interacting with the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Bad credentials, or a token the service no longer accepts.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the failure means the session is no longer valid.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// The message the service sent with the failure, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Auth(message) | Self::Api { message, .. } if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Text to show the administrator.
    ///
    /// Prefers the server's message, then a short description of the
    /// failure class, then [`UNKNOWN_ERROR_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            Self::Network(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::Network(e) if e.is_connect() => "Could not reach the server".to_string(),
            Self::Network(_) => "Network error".to_string(),
            Self::Api { status, .. } => format!("Request failed with status {status}"),
            Self::Auth(_) | Self::Parse(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Remote catalog operations.
///
/// [`HexClient`] is the HTTP implementation; the controller only sees this
/// trait so it can be driven without a network.
pub trait CatalogApi {
    /// `POST /admin/signin`
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<SignIn, ApiError>> + Send;

    /// `POST /api/user/check`
    fn check(&self, token: &SecretString) -> impl Future<Output = Result<UserCheck, ApiError>> + Send;

    /// `GET /api/{path}/admin/products`
    fn list_products(
        &self,
        token: &SecretString,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;

    /// `GET /api/{path}/admin/products/all`
    fn all_products(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<BTreeMap<ProductId, Product>, ApiError>> + Send;

    /// `POST /api/{path}/admin/product`
    fn create_product(
        &self,
        token: &SecretString,
        payload: &ProductPayload,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// `PUT /api/{path}/admin/product/{id}`
    fn update_product(
        &self,
        token: &SecretString,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// `DELETE /api/{path}/admin/product/{id}`
    fn delete_product(
        &self,
        token: &SecretString,
        id: &ProductId,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}
