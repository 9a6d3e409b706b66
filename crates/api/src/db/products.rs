//! Product repository.
//!
//! Listing queries are assembled with [`QueryBuilder`]: every filter value is
//! a bind parameter, and the only interpolated SQL is the `ORDER BY` column
//! and direction, which come from the closed [`SortField`]/[`SortOrder`] enums.
//!
//! [`SortField`]: crate::models::SortField
//! [`SortOrder`]: crate::models::SortOrder

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use shopdemo_core::{CategoryId, Money, ProductId};

use super::RepositoryError;
use crate::models::catalog::{
    Category, Pagination, Product, ProductFilter, ProductInput, ProductPage, ProductPatch,
};

/// Column list for a product joined with its category.
///
/// Shared with the cart queries, which embed a product in each line.
macro_rules! product_columns {
    () => {
        r"
        p.id, p.name, p.description, p.price, p.category_id, p.image_url,
        p.stock, p.featured, p.created_at, p.updated_at,
        c.name AS category_name,
        c.description AS category_description,
        c.image_url AS category_image_url
        "
    };
}
pub(super) use product_columns;

/// Row type for a product joined with its category.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Money,
    category_id: CategoryId,
    image_url: Option<String>,
    stock: i32,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    category_description: Option<String>,
    category_image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            image_url: row.image_url,
            stock: row.stock,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                description: row.category_description,
                image_url: row.category_image_url,
            },
        }
    }
}

/// Append the `WHERE` clause for a listing filter.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        qb.push(" AND c.name = ").push_bind(category.clone());
    }
    if filter.featured_only {
        qb.push(" AND p.featured");
    }
    if let Some(pattern) = filter.search_pattern() {
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of products matching a filter, with paging metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn search(&self, filter: &ProductFilter) -> Result<ProductPage, RepositoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM shop.product p JOIN shop.category c ON c.id = p.category_id",
        );
        push_filters(&mut count_qb, filter);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p JOIN shop.category c ON c.id = p.category_id"
        ));
        push_filters(&mut qb, filter);
        // p.id breaks ties so pages never overlap
        qb.push(" ORDER BY ")
            .push(filter.sort_by.column())
            .push(" ")
            .push(filter.sort_order.keyword())
            .push(", p.id ")
            .push(filter.sort_order.keyword());
        qb.push(" LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;

        Ok(ProductPage {
            products: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination::new(total, filter.page, filter.limit),
        })
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p JOIN shop.category c ON c.id = p.category_id WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO shop.product
                (name, description, price, category_id, image_url, stock, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id)
        .bind(input.image_url.as_deref())
        .bind(input.stock)
        .bind(input.featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product already exists", "Category not found"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update. Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::InvalidReference` if the new category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let updated: Option<(ProductId,)> = sqlx::query_as(
            r"
            UPDATE shop.product SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category_id = COALESCE($5, category_id),
                image_url = COALESCE($6, image_url),
                stock = COALESCE($7, stock),
                featured = COALESCE($8, featured),
                updated_at = now()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.category_id)
        .bind(patch.image_url.as_deref())
        .bind(patch.stock)
        .bind(patch.featured)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product already exists", "Category not found"))?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Cart lines referencing it are removed and order
    /// items keep their snapshot with a cleared product reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a product unless one with the same name exists in the category.
    ///
    /// Returns `true` when a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_missing(&self, input: &ProductInput) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shop.product
                (name, description, price, category_id, image_url, stock, featured)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (
                SELECT 1 FROM shop.product WHERE name = $1 AND category_id = $4
            )
            ",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id)
        .bind(input.image_url.as_deref())
        .bind(input.stock)
        .bind(input.featured)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
