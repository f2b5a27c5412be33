//! Request and response bodies for the catalog API.

use std::collections::BTreeMap;

use catalog_admin_core::{Pagination, Product, ProductId, Session, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /admin/signin`.
#[derive(Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from `POST /admin/signin`.
#[derive(Deserialize)]
pub(crate) struct SignInResponse {
    pub token: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expired: i64,
    #[serde(default)]
    pub uid: Option<UserId>,
}

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    /// Token and expiry to persist.
    pub session: Session,
    /// Account key, when the service reports one.
    pub uid: Option<UserId>,
}

/// Response from `POST /api/user/check`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserCheck {
    #[serde(default)]
    pub uid: Option<UserId>,
}

/// Page and category selector for the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductQuery {
    /// A specific page, keeping the category.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            category: self.category.clone(),
        }
    }
}

/// One page of the product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Response from `GET /api/{path}/admin/products/all`: products keyed by id.
#[derive(Deserialize)]
pub(crate) struct AllProductsResponse {
    #[serde(default)]
    pub products: BTreeMap<ProductId, Product>,
}

/// The `success`/`message` pair present on every response.
#[derive(Debug, Deserialize)]
pub(crate) struct Status {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<Value>,
}

const fn default_success() -> bool {
    true
}

impl Default for Status {
    fn default() -> Self {
        Self {
            success: default_success(),
            message: None,
        }
    }
}

impl Status {
    /// The message as display text (validation lists are joined).
    pub fn message_text(&self) -> Option<String> {
        self.message.as_ref().and_then(message_text)
    }
}

/// Flatten a `message` value: strings as-is, lists joined with `; `.
pub(crate) fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
