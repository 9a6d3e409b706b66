//! Shopdemo Core - Shared domain types.
//!
//! This crate provides common types used across all shopdemo components:
//! - `api` - The REST backend (catalog, cart, orders, auth)
//! - `cli` - Migrations, seeding, and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! The optional `postgres` feature adds `sqlx` encode/decode support so the
//! types can be bound and read directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, quantities, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
