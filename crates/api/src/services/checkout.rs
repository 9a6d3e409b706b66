//! Checkout: turn a user's cart into an order.
//!
//! The whole flow runs in one transaction. Cart rows are locked first, so a
//! second concurrent checkout of the same cart waits and then sees an empty
//! cart. Only the locked lines are removed afterwards; a line added mid-checkout
//! stays in the cart for the next order. The arithmetic lives in
//! [`CheckoutPlan`], which needs no database.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopdemo_core::{CartItemId, Money, MoneyError, UserId};

use crate::db::{RepositoryError, cart, orders};
use crate::models::cart::CartLine;
use crate::models::order::Order;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The order total does not fit the money type.
    #[error("order total out of range: {0}")]
    Total(#[from] MoneyError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Largest total the `shop.order.total` column (`NUMERIC(12, 2)`) can hold.
const MAX_ORDER_TOTAL_CENTS: i64 = 999_999_999_999;

/// Priced cart lines ready to be written as an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    lines: Vec<CartLine>,
    total: Money,
}

impl CheckoutPlan {
    /// Price a set of cart lines at their current unit prices.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for no lines, or
    /// `CheckoutError::Total` if the sum overflows or exceeds what an order
    /// can record.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = lines.iter().try_fold(Money::ZERO, |acc, line| {
            line.unit_price
                .checked_mul_qty(line.quantity.get())
                .and_then(|subtotal| acc.checked_add(subtotal))
        })?;
        if total > Money::from_cents(MAX_ORDER_TOTAL_CENTS) {
            return Err(MoneyError::Overflow.into());
        }

        Ok(Self { lines, total })
    }

    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The cart lines this plan consumes.
    #[must_use]
    pub fn cart_item_ids(&self) -> Vec<CartItemId> {
        self.lines.iter().map(|line| line.cart_item_id).collect()
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for everything in the user's cart and empty the cart.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::Repository` if any database step fails.
    #[instrument(skip(self))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let lines = cart::lock_lines_for_checkout(&mut tx, user_id).await?;
        // Dropping `tx` on the error path rolls back and releases the locks.
        let plan = CheckoutPlan::from_lines(lines)?;

        let order_id = orders::insert_order(&mut tx, user_id, plan.total(), plan.lines()).await?;
        let cleared = cart::remove_lines(&mut tx, user_id, &plan.cart_item_ids()).await?;
        let order = orders::fetch_order(&mut tx, order_id).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            items = plan.lines().len(),
            cleared,
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }
}
