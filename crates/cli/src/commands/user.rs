//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli user create -e jane@example.com -p s3cret! --first-name Jane --admin
//! shop-cli user promote -e jane@example.com --role admin
//! ```

use shopdemo_api::db::{RepositoryError, UserRepository};
use shopdemo_api::services::{AuthService, Registration};
use shopdemo_core::{Email, Role};

use super::{CommandError, connect};

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, the email is taken,
/// or the database operation fails.
pub async fn create(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    admin: bool,
) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let role = if admin { Role::Admin } else { Role::User };

    let user = AuthService::new(&pool, config.token_ttl)
        .create_user(Registration {
            email,
            password,
            first_name,
            last_name,
            role,
        })
        .await?;
    pool.close().await;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

/// Change an existing user's role.
///
/// # Errors
///
/// Returns an error if the role is unknown, no user has the email, or the
/// database operation fails.
pub async fn set_role(email: &str, role: &str) -> Result<(), CommandError> {
    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;

    let (_, pool) = connect().await?;
    let result = UserRepository::new(&pool).set_role(&email, role).await;
    pool.close().await;

    let user = result.map_err(|e| match e {
        RepositoryError::NotFound => CommandError::UserNotFound(email.to_string()),
        other => other.into(),
    })?;

    tracing::info!("User {} now has role {}", user.email, user.role);
    Ok(())
}
