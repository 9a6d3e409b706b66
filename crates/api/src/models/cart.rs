//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopdemo_core::{CartItemId, Money, ProductId, Quantity, UserId};

use super::catalog::Product;

/// A cart line item joined with its product (and the product's category).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product: Product,
}

/// Result of an add-to-cart upsert.
#[derive(Debug, Clone)]
pub struct AddToCartOutcome {
    pub item: CartItem,
    /// `true` when a new line was inserted, `false` when an existing line was incremented.
    pub created: bool,
}

/// A cart line as seen by checkout: the product's live price at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
}
