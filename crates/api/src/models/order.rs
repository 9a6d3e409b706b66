//! Order domain types.
//!
//! Orders are immutable once created. Each item carries the unit price that
//! was captured at checkout; `product` is only a convenience view of the
//! product as it is now, and is `None` once the product has been deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopdemo_core::{Money, OrderId, OrderItemId, ProductId, Quantity, UserId};

/// A placed order with its items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line of an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: Quantity,
    /// Snapshot unit price.
    pub price: Money,
    pub product: Option<OrderProduct>,
}

/// Current view of the product an order item refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Money,
}
