//! Bearer token storage.
//!
//! Only the SHA-256 hash of a token is stored; the plaintext is handed to the
//! client once at login and never persisted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopdemo_core::{ApiTokenId, Role, UserId};

use super::RepositoryError;
use crate::models::user::CurrentUser;

#[derive(Debug, sqlx::FromRow)]
struct TokenOwnerRow {
    user_id: UserId,
    role: Role,
}

/// Repository for bearer token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a token hash for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a (astronomically unlikely) hash collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ApiTokenId, RepositoryError> {
        let (id,): (ApiTokenId,) = sqlx::query_as(
            r"
            INSERT INTO shop.api_token (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "token already exists", "unknown user"))?;

        Ok(id)
    }

    /// Resolve an unexpired token hash to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_owner(&self, token_hash: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenOwnerRow>(
            r"
            SELECT u.id AS user_id, u.role
            FROM shop.api_token t
            JOIN shop.user u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > now()
            ",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| CurrentUser {
            id: r.user_id,
            role: r.role,
        }))
    }

    /// Delete a token by hash.
    ///
    /// Returns `true` if a token was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revoke(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.api_token WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all expired tokens, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.api_token WHERE expires_at <= now()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
