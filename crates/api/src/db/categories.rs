//! Category repository.

use sqlx::PgPool;

use shopdemo_core::CategoryId;

use super::RepositoryError;
use crate::models::catalog::{Category, CategoryWithCount};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryCountRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    product_count: i64,
}

impl From<CategoryCountRow> for CategoryWithCount {
    fn from(row: CategoryCountRow) -> Self {
        Self {
            category: row.category.into(),
            product_count: row.product_count,
        }
    }
}

/// Repository for category reads.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every category with its product count, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            r"
            SELECT c.id, c.name, c.description, c.image_url,
                   COUNT(p.id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one category with its product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<CategoryWithCount>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryCountRow>(
            r"
            SELECT c.id, c.name, c.description, c.image_url,
                   COUNT(p.id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product p ON p.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a category unless one with the same name exists, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(
        &self,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<CategoryId, RepositoryError> {
        let (id,): (CategoryId,) = sqlx::query_as(
            r"
            INSERT INTO shop.category (name, description, image_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}
