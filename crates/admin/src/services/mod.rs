//! Business logic services for the catalog admin.
//!
//! # Services
//!
//! - `auth` - Sign-in, stored-session lookup and sign-out
//! - `catalog` - The fetched product page, paging and selection
//! - `draft` - Create/edit form state machine

pub mod auth;
pub mod catalog;
pub mod draft;

pub use auth::AuthService;
pub use catalog::Catalog;
pub use draft::{DraftWorkflow, Modal, Submission};
