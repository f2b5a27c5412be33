//! Unified error handling for the admin controller.

use catalog_admin_core::{DraftError, ProductId};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionStoreError;

/// Controller-level error type.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Remote API operation failed.
    #[error("Catalog API error: {0}")]
    Api(#[from] ApiError),

    /// Session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionStoreError),

    /// The open draft cannot be turned into a request.
    #[error("Invalid product: {0}")]
    InvalidDraft(#[from] DraftError),

    /// No product with this id in the catalog.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// The operation needs a signed-in session.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AdminError {
    /// Whether the failure means the session is no longer valid.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::Api(e) => e.is_auth(),
            Self::NotAuthenticated => true,
            _ => false,
        }
    }

    /// Alert text for the administrator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            // Don't expose file system details in alerts
            Self::Session(_) => "Could not access the saved session".to_string(),
            Self::InvalidDraft(e) => e.to_string(),
            Self::NotFound(_) => "Product not found".to_string(),
            Self::NotAuthenticated => "Please sign in".to_string(),
            Self::Config(e) => e.to_string(),
        }
    }
}
