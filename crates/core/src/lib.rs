//! Catalog Admin Core - Shared types library.
//!
//! This crate provides the types used across the catalog admin components:
//! - `admin` - API client, session stores and the admin controller
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and conversions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows the draft
//! and payload rules to be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Product, draft, price, pagination, credential and session types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
