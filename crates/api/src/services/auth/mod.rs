//! Authentication service.
//!
//! Password accounts with opaque bearer tokens. A token is 32 random bytes,
//! URL-safe base64 encoded and handed to the client once; the database only
//! ever sees its SHA-256 digest.

mod error;

pub use error::AuthError;

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeDelta, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use shopdemo_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::{NewUser, UserRepository};
use crate::models::user::{CurrentUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length (bounds Argon2 work on hostile input).
const MAX_PASSWORD_LENGTH: usize = 1024;

/// Bytes of randomness in a bearer token.
const TOKEN_BYTES: usize = 32;

/// An issued bearer token and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Details for a new account.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub first_name: &'r str,
    pub last_name: &'r str,
    pub role: Role,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            token_ttl,
        }
    }

    /// Create an account without issuing a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        self.users
            .create(&NewUser {
                email: &email,
                password_hash: &password_hash,
                first_name: registration.first_name.trim(),
                last_name: registration.last_name.trim(),
                role: registration.role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Register a shopper account and log it in.
    ///
    /// # Errors
    ///
    /// See [`AuthService::create_user`].
    pub async fn register(&self, registration: Registration<'_>) -> Result<AuthSession, AuthError> {
        let user = self.create_user(registration).await?;
        let token = self.issue_token(user.id).await?;
        Ok(AuthSession { token, user })
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(user.id).await?;
        Ok(AuthSession { token, user })
    }

    /// Resolve a presented bearer token to the current user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or expired.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        self.tokens
            .find_owner(&hash_token(token))
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Revoke a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.revoke(&hash_token(token)).await?;
        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn purge_expired_tokens(&self) -> Result<u64, AuthError> {
        Ok(self.tokens.purge_expired().await?)
    }

    async fn issue_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let ttl = TimeDelta::from_std(self.token_ttl).map_err(|_| AuthError::TokenGeneration)?;
        let token = generate_token();
        self.tokens
            .insert(user_id, &hash_token(&token), Utc::now() + ttl)
            .await?;
        Ok(token)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a fresh opaque bearer token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hex digest of a token, as stored in `shop.api_token`.
pub(crate) fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
