//! Catalog admin library.
//!
//! Signs an administrator in to the course e-commerce API, keeps the
//! session token on disk, and drives product create/edit/delete against one
//! tenant's catalog.
//!
//! # Layers
//!
//! - [`api`] - HTTP client and the [`api::CatalogApi`] seam
//! - [`session`] - Where the sign-in token is persisted
//! - [`services`] - Authentication, catalog page and draft workflow
//! - [`state`] - The controller the front end drives
//!
//! # Security
//!
//! The session file grants full write access to the tenant's catalog. It is
//! created readable by the current user only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use api::{ApiError, CatalogApi, HexClient};
pub use config::{AdminConfig, ApiConfig, ConfigError, LogFormat};
pub use error::AdminError;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionStoreError};
pub use state::{AdminState, Loading, View};
