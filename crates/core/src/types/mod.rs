//! Core types for the catalog admin.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod credential;
pub mod draft;
pub mod email;
pub mod id;
pub mod pagination;
pub mod price;
pub mod product;
pub mod session;

pub use credential::Credentials;
pub use draft::{Draft, DraftError, ImageSlots, MAX_IMAGES};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::Pagination;
pub use price::{Price, PriceError};
pub use product::{DataEnvelope, Product, ProductPayload};
pub use session::Session;
