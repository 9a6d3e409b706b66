//! Order repository.
//!
//! Orders are written once, inside the checkout transaction, and only read
//! afterwards. Reads are always scoped by the owning user.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};

use shopdemo_core::{Money, OrderId, OrderItemId, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;
use crate::models::order::{Order, OrderItem, OrderProduct};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    price: Money,
    current_name: Option<String>,
    current_image_url: Option<String>,
    current_price: Option<Money>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {} quantity: {e}", row.id))
        })?;

        // The join only yields a product while it still exists.
        let product = match (row.product_id, row.current_name, row.current_price) {
            (Some(id), Some(name), Some(price)) => Some(OrderProduct {
                id,
                name,
                image_url: row.current_image_url,
                price,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity,
            price: row.price,
            product,
        })
    }
}

/// Load items for a set of orders, grouped by order.
async fn load_items<'e>(
    executor: impl PgExecutor<'e>,
    order_ids: &[OrderId],
) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
    let ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();
    let rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT oi.id, oi.order_id, oi.product_id, oi.product_name, oi.quantity, oi.price,
               p.name AS current_name, p.image_url AS current_image_url,
               p.price AS current_price
        FROM shop.order_item oi
        LEFT JOIN shop.product p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.order_id, oi.id
        ",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        let item = OrderItem::try_from(row)?;
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

fn assemble(row: OrderRow, items: &mut HashMap<OrderId, Vec<OrderItem>>) -> Order {
    Order {
        id: row.id,
        user_id: row.user_id,
        total: row.total,
        created_at: row.created_at,
        items: items.remove(&row.id).unwrap_or_default(),
    }
}

/// Repository for order reads.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first, each with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total, created_at
            FROM shop.order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut items = load_items(self.pool, &ids).await?;
        Ok(rows.into_iter().map(|r| assemble(r, &mut items)).collect())
    }

    /// One of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total, created_at
            FROM shop.order
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut items = load_items(self.pool, &[row.id]).await?;
        Ok(Some(assemble(row, &mut items)))
    }
}

// =============================================================================
// Checkout (transactional)
// =============================================================================

/// Insert an order and one item per cart line, snapshotting name and price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
    total: Money,
    lines: &[CartLine],
) -> Result<OrderId, RepositoryError> {
    let (order_id,): (OrderId,) = sqlx::query_as(
        r"
        INSERT INTO shop.order (user_id, total)
        VALUES ($1, $2)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(total)
    .fetch_one(&mut *conn)
    .await?;

    for line in lines {
        sqlx::query(
            r"
            INSERT INTO shop.order_item (order_id, product_id, product_name, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity.as_i32())
        .bind(line.unit_price)
        .execute(&mut *conn)
        .await?;
    }

    Ok(order_id)
}

/// Read back an order with its items on the same connection.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
/// Returns `RepositoryError::Database` if a query fails.
pub async fn fetch_order(conn: &mut PgConnection, id: OrderId) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, user_id, total, created_at FROM shop.order WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    let mut items = load_items(&mut *conn, &[row.id]).await?;
    Ok(assemble(row, &mut items))
}
