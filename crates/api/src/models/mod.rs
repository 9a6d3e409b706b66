//! Domain models for the shop API.
//!
//! These types represent validated domain objects separate from database row
//! types (rows live next to their queries in [`crate::db`]). All of them
//! serialise with camelCase field names, matching the frontend contract.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{AddToCartOutcome, CartItem, CartLine};
pub use catalog::{
    Category, CategoryWithCount, FilterError, Pagination, Product, ProductFilter, ProductInput,
    ProductPage, ProductPatch, ProductQueryParams, SortField, SortOrder,
};
pub use order::{Order, OrderItem, OrderProduct};
pub use user::{CurrentUser, User};

use serde::Serialize;

/// Body for endpoints that only acknowledge an action.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
