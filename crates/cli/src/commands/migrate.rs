//! Database migration command.
//!
//! Applies the migrations embedded from `crates/api/migrations/`. Already
//! applied migrations are skipped, so this is safe to run on every deploy.
//!
//! ```bash
//! shop-cli migrate
//! ```

use shopdemo_api::db;

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations complete!");
    Ok(())
}
