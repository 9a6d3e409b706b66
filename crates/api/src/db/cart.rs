//! Cart repository.
//!
//! Every statement that touches an existing line is scoped by `user_id`, so a
//! caller can never read or modify another user's cart. A line that exists
//! but belongs to someone else is reported as `NotFound`.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use shopdemo_core::{CartItemId, Money, ProductId, Quantity, UserId};

use super::RepositoryError;
use super::products::{ProductRow, product_columns};
use crate::models::cart::{AddToCartOutcome, CartItem, CartLine};

/// Row type for a cart line joined with its product and category.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    cart_item_id: CartItemId,
    user_id: UserId,
    quantity: i32,
    cart_created_at: DateTime<Utc>,
    cart_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = parse_quantity(row.quantity)?;
        let product: crate::models::Product = row.product.into();
        Ok(Self {
            id: row.cart_item_id,
            user_id: row.user_id,
            product_id: product.id,
            quantity,
            created_at: row.cart_created_at,
            updated_at: row.cart_updated_at,
            product,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    cart_item_id: CartItemId,
    product_id: ProductId,
    product_name: String,
    unit_price: Money,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cart_item_id: row.cart_item_id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: parse_quantity(row.quantity)?,
        })
    }
}

fn parse_quantity(raw: i32) -> Result<Quantity, RepositoryError> {
    Quantity::new(i64::from(raw))
        .map_err(|e| RepositoryError::DataCorruption(format!("cart quantity {raw}: {e}")))
}

/// Select a single joined cart line by ID for one user.
const SELECT_LINE: &str = concat!(
    r"
    SELECT ci.id AS cart_item_id, ci.user_id, ci.quantity,
           ci.created_at AS cart_created_at, ci.updated_at AS cart_updated_at,
    ",
    product_columns!(),
    r"
    FROM shop.cart_item ci
    JOIN shop.product p ON p.id = ci.product_id
    JOIN shop.category c ON c.id = p.category_id
    WHERE ci.id = $1 AND ci.user_id = $2
    "
);

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a user's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(concat!(
            r"
            SELECT ci.id AS cart_item_id, ci.user_id, ci.quantity,
                   ci.created_at AS cart_created_at, ci.updated_at AS cart_updated_at,
            ",
            product_columns!(),
            r"
            FROM shop.cart_item ci
            JOIN shop.product p ON p.id = ci.product_id
            JOIN shop.category c ON c.id = p.category_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at, ci.id
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add a product to the cart, incrementing the line if it already exists.
    ///
    /// A single upsert on `(user_id, product_id)`; concurrent adds of the
    /// same product always end in one line with the summed quantity (capped
    /// at [`Quantity::MAX`]).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<AddToCartOutcome, RepositoryError> {
        let (id, inserted): (CartItemId, bool) = sqlx::query_as(
            r"
            INSERT INTO shop.cart_item AS ci (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT cart_item_user_product_key DO UPDATE
            SET quantity = LEAST(ci.quantity + EXCLUDED.quantity, $4),
                updated_at = now()
            RETURNING id, (xmax = 0) AS inserted
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.as_i32())
        .bind(i32::try_from(Quantity::MAX).unwrap_or(i32::MAX))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "duplicate cart line", "Product not found"))?;

        let item = self.get(id, user_id).await?.ok_or(RepositoryError::NotFound)?;
        Ok(AddToCartOutcome {
            item,
            created: inserted,
        })
    }

    /// Get one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: CartItemId,
        user_id: UserId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(SELECT_LINE)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Overwrite the quantity of one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is missing or owned by another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_quantity(
        &self,
        id: CartItemId,
        user_id: UserId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_item
            SET quantity = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(quantity.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id, user_id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is missing or owned by another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove(&self, id: CartItemId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Checkout (transactional)
// =============================================================================

/// Lock and load a user's cart lines with the products' current prices.
///
/// Rows stay locked until the surrounding transaction ends, so two checkouts
/// of the same cart run one after the other.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_lines_for_checkout(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT ci.id AS cart_item_id, p.id AS product_id, p.name AS product_name,
               p.price AS unit_price, ci.quantity
        FROM shop.cart_item ci
        JOIN shop.product p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at, ci.id
        FOR UPDATE OF ci
        ",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Delete the given lines from the user's cart, returning how many were removed.
///
/// Checkout passes the ids it locked, so a line added while the order was
/// being written stays in the cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn remove_lines(
    conn: &mut PgConnection,
    user_id: UserId,
    cart_item_ids: &[CartItemId],
) -> Result<u64, RepositoryError> {
    let ids: Vec<i32> = cart_item_ids.iter().map(|id| id.as_i32()).collect();
    let result = sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1 AND id = ANY($2)")
        .bind(user_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
