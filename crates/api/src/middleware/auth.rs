//! Bearer token extractors.
//!
//! `Authorization: Bearer <token>` is resolved against `shop.api_token` on
//! every request. Handlers declare what they need in their signature:
//!
//! ```rust,ignore
//! async fn get_cart(
//!     State(state): State<AppState>,
//!     RequireAuth(user): RequireAuth,
//! ) -> Result<ApiJson<Vec<CartItem>>> {
//!     // user.id is the authenticated caller
//! }
//! ```

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::models::user::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a valid bearer token belonging to an admin.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub CurrentUser);

/// The raw token presented with the request, for logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything other than a single
/// non-empty token after `Bearer` is rejected.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

fn token_from_parts(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(parse_bearer)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))
}

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        token_from_parts(parts).map(|t| Self(t.to_owned()))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?;
        let user = AuthService::new(state.pool(), state.config().token_ttl)
            .authenticate(token)
            .await?;

        tracing::Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id);

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}
