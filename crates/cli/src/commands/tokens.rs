//! Bearer token maintenance.

use shopdemo_api::services::AuthService;

use super::{CommandError, connect};

/// Delete every expired token.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn purge() -> Result<(), CommandError> {
    let (config, pool) = connect().await?;

    let removed = AuthService::new(&pool, config.token_ttl)
        .purge_expired_tokens()
        .await?;
    pool.close().await;

    tracing::info!(removed, "Expired tokens purged");
    Ok(())
}
